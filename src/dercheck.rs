//! Derivative-consistency checking: compare a model's reported gradient,
//! Jacobian, and Hessian against centered finite-difference estimates.
//!
//! A mismatch is *data*, not an error: each check returns the collection of
//! flagged entries, and an empty collection means no inconsistency was
//! detected at the configured tolerance. Errors are reserved for malformed
//! input (wrong-length vectors) and models missing a required capability.
//!
//! The default tolerance is `√ε`, matching the truncation-error order of a
//! centered difference; the default step is `∛ε`, the step that balances
//! truncation against rounding for that stencil. Checks are a diagnostic,
//! not a proof — finite differences carry their own error floor, so tighten
//! tolerances with care.

use crate::error::Result;
use crate::float::Float;
use crate::model::NlpModel;
use crate::operator::dot;

/// Tolerances and probing strategy for the derivative checks.
#[derive(Debug, Clone)]
pub struct CheckOptions<F> {
    /// Relative-error threshold above which an entry is flagged.
    pub tol: F,
    /// Finite-difference step.
    pub step: F,
    /// When `Some(k)` with `k` below the variable count, the gradient
    /// check probes `k` pseudo-random ±1/√n directions instead of every
    /// coordinate. Deterministic across runs.
    pub probes: Option<usize>,
}

impl<F: Float> Default for CheckOptions<F> {
    fn default() -> Self {
        let eps = F::epsilon();
        CheckOptions {
            tol: eps.sqrt(),
            step: eps.cbrt(),
            probes: None,
        }
    }
}

/// A flagged gradient entry (or probe direction).
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDiscrepancy<F> {
    /// Coordinate index, or probe index when probing.
    pub index: usize,
    /// Finite-difference estimate.
    pub expected: F,
    /// Model-reported value.
    pub observed: F,
    /// `|observed − expected| / max(1, |expected|)`.
    pub relative_error: F,
}

/// A flagged Jacobian or Hessian entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDiscrepancy<F> {
    /// Row index (constraint index for Jacobians).
    pub row: usize,
    /// Column index (variable index).
    pub col: usize,
    /// Finite-difference estimate (or mirror entry for symmetry checks).
    pub expected: F,
    /// Model-reported value.
    pub observed: F,
    /// `|observed − expected| / max(1, |expected|)`.
    pub relative_error: F,
}

fn relative_error<F: Float>(observed: F, expected: F) -> F {
    (observed - expected).abs() / expected.abs().max(F::one())
}

/// Deterministic xorshift64 step, for probe directions.
fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// Check the gradient against centered differences of the objective.
///
/// One flag per coordinate whose relative error exceeds `opts.tol`. With
/// `opts.probes` set (and smaller than the dimension), directional
/// derivatives along pseudo-random ±1/√n directions are checked instead,
/// and flag indices number the probes.
pub fn gradient_check<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &[F],
    opts: &CheckOptions<F>,
) -> Result<Vec<GradientDiscrepancy<F>>> {
    model.meta().check_x("x", x)?;
    let g = model.grad(x)?;
    let n = x.len();
    let h = opts.step;
    let two_h = h + h;
    let mut flagged = Vec::new();

    match opts.probes {
        Some(k) if k < n => {
            let scale = F::one() / F::from_usize(n).unwrap().sqrt();
            let mut state = 0x9e3779b97f4a7c15u64;
            for probe in 0..k {
                let mut d = vec![F::zero(); n];
                for di in d.iter_mut() {
                    *di = if xorshift(&mut state) & 1 == 0 {
                        scale
                    } else {
                        -scale
                    };
                }
                let mut xp = x.to_vec();
                let mut xm = x.to_vec();
                for j in 0..n {
                    xp[j] = xp[j] + h * d[j];
                    xm[j] = xm[j] - h * d[j];
                }
                let fd = (model.obj(&xp)? - model.obj(&xm)?) / two_h;
                let ana = dot(&g, &d);
                let rel = relative_error(ana, fd);
                if rel > opts.tol {
                    flagged.push(GradientDiscrepancy {
                        index: probe,
                        expected: fd,
                        observed: ana,
                        relative_error: rel,
                    });
                }
            }
        }
        _ => {
            for j in 0..n {
                let mut xp = x.to_vec();
                let mut xm = x.to_vec();
                xp[j] = xp[j] + h;
                xm[j] = xm[j] - h;
                let fd = (model.obj(&xp)? - model.obj(&xm)?) / two_h;
                let rel = relative_error(g[j], fd);
                if rel > opts.tol {
                    flagged.push(GradientDiscrepancy {
                        index: j,
                        expected: fd,
                        observed: g[j],
                        relative_error: rel,
                    });
                }
            }
        }
    }

    Ok(flagged)
}

/// Check the Jacobian against centered differences of the constraints.
///
/// Works column by column through the `jprod` primitive — the full
/// Jacobian is never materialized.
pub fn jacobian_check<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &[F],
    opts: &CheckOptions<F>,
) -> Result<Vec<EntryDiscrepancy<F>>> {
    model.meta().check_x("x", x)?;
    let (n, m) = (model.meta().nvar, model.meta().ncon);
    let h = opts.step;
    let two_h = h + h;
    let mut flagged = Vec::new();

    for j in 0..n {
        let mut ej = vec![F::zero(); n];
        ej[j] = F::one();
        let jv = model.jprod(x, &ej)?;

        let mut xp = x.to_vec();
        let mut xm = x.to_vec();
        xp[j] = xp[j] + h;
        xm[j] = xm[j] - h;
        let cp = model.cons(&xp)?;
        let cm = model.cons(&xm)?;

        for i in 0..m {
            let fd = (cp[i] - cm[i]) / two_h;
            let rel = relative_error(jv[i], fd);
            if rel > opts.tol {
                flagged.push(EntryDiscrepancy {
                    row: i,
                    col: j,
                    expected: fd,
                    observed: jv[i],
                    relative_error: rel,
                });
            }
        }
    }

    Ok(flagged)
}

/// Gradient of the weighted Lagrangian `obj_weight·f + yᵀc`.
fn lagrangian_grad<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &[F],
    y: Option<&[F]>,
    obj_weight: F,
) -> Result<Vec<F>> {
    let mut g = model.grad(x)?;
    for gi in g.iter_mut() {
        *gi = *gi * obj_weight;
    }
    if let Some(y) = y {
        if model.meta().ncon > 0 {
            let jty = model.jtprod(x, y)?;
            for (gi, &ji) in g.iter_mut().zip(jty.iter()) {
                *gi = *gi + ji;
            }
        }
    }
    Ok(g)
}

/// Check `hprod` against centered differences of the Lagrangian gradient.
///
/// Column `j` of the reported Hessian (via `hprod` with a unit vector) is
/// compared with the directional second derivative of
/// `obj_weight·f + yᵀc`; the gradient and, when multipliers are given, the
/// transpose Jacobian product supply the differenced quantity.
pub fn hessian_check<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &[F],
    y: Option<&[F]>,
    obj_weight: F,
    opts: &CheckOptions<F>,
) -> Result<Vec<EntryDiscrepancy<F>>> {
    model.meta().check_x("x", x)?;
    model.meta().check_mult("y", y)?;
    let n = model.meta().nvar;
    let h = opts.step;
    let two_h = h + h;
    let mut flagged = Vec::new();

    for j in 0..n {
        let mut ej = vec![F::zero(); n];
        ej[j] = F::one();
        let hv = model.hprod(x, &ej, y, obj_weight)?;

        let mut xp = x.to_vec();
        let mut xm = x.to_vec();
        xp[j] = xp[j] + h;
        xm[j] = xm[j] - h;
        let gp = lagrangian_grad(model, &xp, y, obj_weight)?;
        let gm = lagrangian_grad(model, &xm, y, obj_weight)?;

        for i in 0..n {
            let fd = (gp[i] - gm[i]) / two_h;
            let rel = relative_error(hv[i], fd);
            if rel > opts.tol {
                flagged.push(EntryDiscrepancy {
                    row: i,
                    col: j,
                    expected: fd,
                    observed: hv[i],
                    relative_error: rel,
                });
            }
        }
    }

    Ok(flagged)
}

/// Check that the reported Hessian is symmetric.
///
/// Columns are assembled through `hprod`; a flag for `(i, j)` with `i < j`
/// records `observed = H[i][j]` against `expected = H[j][i]`.
pub fn hessian_symmetry_check<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &[F],
    y: Option<&[F]>,
    obj_weight: F,
    opts: &CheckOptions<F>,
) -> Result<Vec<EntryDiscrepancy<F>>> {
    model.meta().check_x("x", x)?;
    model.meta().check_mult("y", y)?;
    let n = model.meta().nvar;
    let mut columns = Vec::with_capacity(n);
    for j in 0..n {
        let mut ej = vec![F::zero(); n];
        ej[j] = F::one();
        columns.push(model.hprod(x, &ej, y, obj_weight)?);
    }

    let mut flagged = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let upper = columns[j][i];
            let lower = columns[i][j];
            let rel = relative_error(upper, lower);
            if rel > opts.tol {
                flagged.push(EntryDiscrepancy {
                    row: i,
                    col: j,
                    expected: lower,
                    observed: upper,
                    relative_error: rel,
                });
            }
        }
    }

    Ok(flagged)
}
