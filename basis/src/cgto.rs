/* Contracted shell templates for one element, read from NWChem-format
   basis files (as served by the Basis Set Exchange).
*/

use crate::shell::Shell;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BasisParseError {
    UnknownElement(String),
    MixedElements { expected: String, found: String },
    UnsupportedShell(String),
    BadNumber { line: usize, token: String },
    MissingCoefficient { line: usize },
    PrimitiveBeforeHeader { line: usize },
    Empty,
}

impl fmt::Display for BasisParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BasisParseError::UnknownElement(s) => write!(f, "unknown element symbol '{}'", s),
            BasisParseError::MixedElements { expected, found } => write!(
                f,
                "basis block for '{}' found inside basis of '{}'",
                found, expected
            ),
            BasisParseError::UnsupportedShell(s) => write!(f, "unsupported shell type '{}'", s),
            BasisParseError::BadNumber { line, token } => {
                write!(f, "line {}: cannot parse '{}' as a number", line, token)
            }
            BasisParseError::MissingCoefficient { line } => {
                write!(f, "line {}: missing contraction coefficient", line)
            }
            BasisParseError::PrimitiveBeforeHeader { line } => {
                write!(f, "line {}: primitive found before any shell header", line)
            }
            BasisParseError::Empty => write!(f, "no shells found in basis input"),
        }
    }
}

impl std::error::Error for BasisParseError {}

/// Shell data independent of the center it is placed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellTemplate {
    pub l: i32,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementBasis {
    pub symbol: String,
    pub atomic_number: u32,
    pub shells: Vec<ShellTemplate>,
}

// Fortran output sometimes writes exponents as 1.0D+01
fn parse_float(token: &str, line: usize) -> Result<f64, BasisParseError> {
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| BasisParseError::BadNumber {
            line,
            token: token.to_string(),
        })
}

fn shell_columns(shell_type: &str) -> Result<Vec<i32>, BasisParseError> {
    match shell_type.to_ascii_uppercase().as_str() {
        "S" => Ok(vec![0]),
        "P" => Ok(vec![1]),
        "D" => Ok(vec![2]),
        "F" => Ok(vec![3]),
        "G" => Ok(vec![4]),
        "SP" => Ok(vec![0, 1]),
        _ => Err(BasisParseError::UnsupportedShell(shell_type.to_string())),
    }
}

impl ElementBasis {
    // Example of nwchem format:
    //
    // BASIS "ao basis" PRINT
    // #BASIS SET: (6s,3p) -> [2s,1p]
    // O    S
    //     130.7093214              0.1543289673
    //      23.8088661              0.5353281423
    //       6.4436083              0.4446345422
    // O    SP
    //       5.0331513             -0.0999672292           0.1559162750
    //       1.1695961              0.3995128261           0.6076837186
    //       0.3803890              0.7001154689           0.3919573931
    // END
    //
    // An SP header opens two shells (S and P) sharing the exponents.
    pub fn parse_nwchem(input: &str) -> Result<Self, BasisParseError> {
        let mut symbol: Option<String> = None;
        // shells currently being filled, one per coefficient column
        let mut open: Vec<ShellTemplate> = Vec::new();
        let mut shells: Vec<ShellTemplate> = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let upper = line.to_ascii_uppercase();
            if upper.starts_with("BASIS") {
                continue;
            }
            if upper == "END" {
                break;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let is_header = tokens
                .first()
                .map(|t| t.chars().all(char::is_alphabetic))
                .unwrap_or(false);

            if is_header {
                if tokens.len() < 2 {
                    return Err(BasisParseError::UnsupportedShell(line.to_string()));
                }
                match &symbol {
                    None => symbol = Some(tokens[0].to_string()),
                    Some(s) if !s.eq_ignore_ascii_case(tokens[0]) => {
                        return Err(BasisParseError::MixedElements {
                            expected: s.clone(),
                            found: tokens[0].to_string(),
                        });
                    }
                    Some(_) => {}
                }
                shells.append(&mut open);
                open = shell_columns(tokens[1])?
                    .into_iter()
                    .map(|l| ShellTemplate {
                        l,
                        exponents: Vec::new(),
                        coefficients: Vec::new(),
                    })
                    .collect();
                continue;
            }

            if open.is_empty() {
                return Err(BasisParseError::PrimitiveBeforeHeader { line: lineno });
            }
            if tokens.len() < open.len() + 1 {
                return Err(BasisParseError::MissingCoefficient { line: lineno });
            }
            let alpha = parse_float(tokens[0], lineno)?;
            for (col, shell) in open.iter_mut().enumerate() {
                shell.exponents.push(alpha);
                shell.coefficients.push(parse_float(tokens[col + 1], lineno)?);
            }
        }
        shells.append(&mut open);

        // drop headers that never received primitives
        shells.retain(|s| !s.exponents.is_empty());
        let symbol = symbol.ok_or(BasisParseError::Empty)?;
        if shells.is_empty() {
            return Err(BasisParseError::Empty);
        }

        let element = Element::from_symbol(&symbol)
            .ok_or_else(|| BasisParseError::UnknownElement(symbol.clone()))?;

        Ok(Self {
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            shells,
        })
    }

    /// Instantiate every shell template on `center`.
    pub fn shells_at(&self, center: Vector3<f64>) -> Vec<Shell> {
        self.shells
            .iter()
            .map(|t| Shell::new(t.l, t.exponents.clone(), t.coefficients.clone(), center))
            .collect()
    }

    pub fn n_functions(&self) -> usize {
        self.shells
            .iter()
            .map(|s| ((s.l + 1) * (s.l + 2) / 2) as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OXYGEN: &str = r#"
#----------------------------------------------------------------------
#   Basis set: STO-3G
#----------------------------------------------------------------------
BASIS "ao basis" PRINT
#BASIS SET: (6s,3p) -> [2s,1p]
O    S
      0.1307093214E+03       0.1543289673E+00
      0.2380886605E+02       0.5353281423E+00
      0.6443608313E+01       0.4446345422E+00
O    SP
      0.5033151319E+01      -0.9996722919E-01       0.1559162750E+00
      0.1169596125E+01       0.3995128261E+00       0.6076837186E+00
      0.3803889600E+00       0.7001154689E+00       0.3919573931E+00
END
"#;

    #[test]
    fn test_parse_sp_block() {
        let basis = ElementBasis::parse_nwchem(OXYGEN).unwrap();
        assert_eq!(basis.symbol, "O");
        assert_eq!(basis.atomic_number, 8);
        assert_eq!(basis.shells.len(), 3);
        assert_eq!(
            basis.shells.iter().map(|s| s.l).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );
        assert_eq!(basis.shells[2].exponents, basis.shells[1].exponents);
        assert!((basis.shells[2].coefficients[1] - 0.6076837186).abs() < 1e-12);
        assert_eq!(basis.n_functions(), 5);
    }

    #[test]
    fn test_fortran_exponent() {
        let input = "H S\n 3.425250914D+00 1.543289673D-01\nEND\n";
        let basis = ElementBasis::parse_nwchem(input).unwrap();
        assert!((basis.shells[0].exponents[0] - 3.425250914).abs() < 1e-12);
    }

    #[test]
    fn test_parse_d_shell() {
        let input = "C D\n 0.8 1.0\n";
        let basis = ElementBasis::parse_nwchem(input).unwrap();
        assert_eq!(basis.shells[0].l, 2);
        assert_eq!(basis.n_functions(), 6);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ElementBasis::parse_nwchem("H K\n 1.0 1.0\n").unwrap_err(),
            BasisParseError::UnsupportedShell("K".to_string())
        );
        assert_eq!(
            ElementBasis::parse_nwchem("H SP\n 1.0 1.0\n").unwrap_err(),
            BasisParseError::MissingCoefficient { line: 2 }
        );
        assert_eq!(
            ElementBasis::parse_nwchem("# nothing\n").unwrap_err(),
            BasisParseError::Empty
        );
        assert!(matches!(
            ElementBasis::parse_nwchem("H S\n 1.0 1.0\nHe S\n 2.0 1.0\n"),
            Err(BasisParseError::MixedElements { .. })
        ));
    }
}
