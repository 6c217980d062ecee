use super::engine::OneBodyEngine;
use super::IntegralError;
use basis::shell::Shell;
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

/// Evaluate the template's operator over every unique shell pair and return
/// one dense symmetric `nbf x nbf` matrix per operator component.
///
/// The template is cloned once per worker. Each worker owns the column panels
/// of a disjoint set of shells and fills the lower triangle of those panels;
/// the upper triangle is mirrored after the parallel region.
pub fn one_e_driver(
    template: &OneBodyEngine,
    shells: &[Shell],
) -> Result<Vec<DMatrix<f64>>, IntegralError> {
    if shells.is_empty() {
        return Err(IntegralError::EmptyShellList);
    }
    if let Some((idx, sh)) = shells.iter().enumerate().find(|(_, sh)| !template.fits(sh)) {
        return Err(IntegralError::ShellExceedsEngine {
            shell: idx,
            l: sh.l,
            n_prim: sh.n_prim(),
        });
    }

    let nshell = shells.len();
    let mut offsets = Vec::with_capacity(nshell);
    let mut nbf = 0;
    for sh in shells {
        offsets.push(nbf);
        nbf += sh.size();
    }

    let ncomp = template.operator().n_components();
    let mut mats: Vec<DMatrix<f64>> = (0..ncomp).map(|_| DMatrix::zeros(nbf, nbf)).collect();

    let nworkers = rayon::current_num_threads().min(nshell).max(1);
    debug!(
        "one-electron {} integrals: {} shells, {} functions, {} workers",
        template.operator(),
        nshell,
        nbf,
        nworkers
    );

    {
        // panels[s2][comp] = columns of shell s2 in matrix comp
        let mut panels: Vec<Vec<&mut [f64]>> = (0..nshell).map(|_| Vec::with_capacity(ncomp)).collect();
        for mat in mats.iter_mut() {
            let mut rest: &mut [f64] = mat.as_mut_slice();
            for (s2, sh) in shells.iter().enumerate() {
                let (panel, tail) = std::mem::take(&mut rest).split_at_mut(sh.size() * nbf);
                panels[s2].push(panel);
                rest = tail;
            }
        }

        let mut buckets: Vec<Vec<(usize, Vec<&mut [f64]>)>> = (0..nworkers).map(|_| Vec::new()).collect();
        for (s2, panel) in panels.into_iter().enumerate() {
            buckets[s2 % nworkers].push((s2, panel));
        }
        let mut engines: Vec<OneBodyEngine> = (0..nworkers).map(|_| template.clone()).collect();

        engines
            .par_iter_mut()
            .zip(buckets.into_par_iter())
            .for_each(|(engine, bucket)| {
                for (s2, mut panel) in bucket {
                    let n2 = shells[s2].size();
                    for s1 in s2..nshell {
                        let n1 = shells[s1].size();
                        let off1 = offsets[s1];
                        let Some(blocks) = engine.compute(&shells[s1], &shells[s2]) else {
                            continue;
                        };
                        for (block, cols) in blocks.iter().zip(panel.iter_mut()) {
                            for j in 0..n2 {
                                let col = &mut cols[j * nbf + off1..j * nbf + off1 + n1];
                                for (i, dst) in col.iter_mut().enumerate() {
                                    *dst = block[i * n2 + j];
                                }
                            }
                        }
                    }
                }
            });
    }

    for mat in mats.iter_mut() {
        mat.fill_upper_triangle_with_lower_triangle();
    }
    Ok(mats)
}
