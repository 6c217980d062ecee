pub mod basis;
pub mod cgto;
pub mod gto;
pub mod helper;
pub mod shell;

#[cfg(test)]
mod gto_test;
