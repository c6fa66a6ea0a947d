//! Limited-memory BFGS approximation of a Hessian, applied as an operator.
//!
//! This is the *direct* approximation `B ≈ ∇²f` (not its inverse): the
//! operator a quasi-Newton model substitutes for the true Hessian. Each
//! accepted secant pair `(s, y)` performs the rank-two update
//!
//! ```text
//!   B ← B − (B s)(B s)ᵀ / (sᵀ B s) + y yᵀ / (yᵀ s)
//! ```
//!
//! which keeps `B` symmetric positive definite as long as `yᵀs > 0`;
//! pairs violating that curvature condition are skipped. Only the most
//! recent `mem` pairs are kept — pushing beyond the budget evicts the
//! oldest pair.

use crate::error::Result;
use crate::float::Float;
use crate::meta::check_len;
use crate::operator::{dot, norm, LinearOperator};
use crate::quasi_newton::QuasiNewtonOperator;

/// Configuration for [`LbfgsOperator`].
#[derive(Debug, Clone)]
pub struct LbfgsConfig<F> {
    /// Number of secant pairs to store (default: 5).
    pub mem: usize,
    /// Initial approximation `B₀ = init_scale · I` (default: 1).
    pub init_scale: F,
}

impl<F: Float> LbfgsConfig<F> {
    /// Configuration with the given memory budget and unit initial scale.
    pub fn with_mem(mem: usize) -> Self {
        LbfgsConfig {
            mem,
            init_scale: F::one(),
        }
    }
}

impl Default for LbfgsConfig<f64> {
    fn default() -> Self {
        LbfgsConfig {
            mem: 5,
            init_scale: 1.0,
        }
    }
}

impl Default for LbfgsConfig<f32> {
    fn default() -> Self {
        LbfgsConfig {
            mem: 5,
            init_scale: 1.0,
        }
    }
}

/// Limited-memory BFGS Hessian approximation.
///
/// Stores the pair history plus, per pair, the precomputed vector
/// `bᵢ = Bᵢ sᵢ` and scalar `sᵢᵀ Bᵢ sᵢ` (with `Bᵢ` the approximation
/// before pair `i`), so one application costs `O(mem · n)`.
#[derive(Debug, Clone)]
pub struct LbfgsOperator<F> {
    n: usize,
    config: LbfgsConfig<F>,
    s_hist: Vec<Vec<F>>,
    y_hist: Vec<Vec<F>>,
    sy_hist: Vec<F>,
    b_hist: Vec<Vec<F>>,
    sbs_hist: Vec<F>,
}

impl<F: Float> LbfgsOperator<F> {
    /// Fresh approximation `B = init_scale · I` of dimension `n`.
    pub fn new(n: usize, config: LbfgsConfig<F>) -> Self {
        LbfgsOperator {
            n,
            config,
            s_hist: Vec::new(),
            y_hist: Vec::new(),
            sy_hist: Vec::new(),
            b_hist: Vec::new(),
            sbs_hist: Vec::new(),
        }
    }

    /// Memory budget.
    pub fn mem(&self) -> usize {
        self.config.mem
    }

    /// Apply the approximation built from the first `k` stored pairs.
    fn apply_upto(&self, k: usize, v: &[F], out: &mut [F]) {
        for (o, &vi) in out.iter_mut().zip(v.iter()) {
            *o = self.config.init_scale * vi;
        }
        for i in 0..k {
            let yv = dot(&self.y_hist[i], v) / self.sy_hist[i];
            let bv = dot(&self.b_hist[i], v) / self.sbs_hist[i];
            for j in 0..self.n {
                out[j] = out[j] + yv * self.y_hist[i][j] - bv * self.b_hist[i][j];
            }
        }
    }

    /// Recompute the per-pair update vectors after the history changes.
    fn rebuild(&mut self) {
        self.b_hist.clear();
        self.sbs_hist.clear();
        for i in 0..self.s_hist.len() {
            let mut bs = vec![F::zero(); self.n];
            self.apply_upto(i, &self.s_hist[i], &mut bs);
            let sbs = dot(&self.s_hist[i], &bs);
            // SPD is preserved by construction; sbs > 0 whenever sy > 0
            debug_assert!(sbs > F::zero());
            self.b_hist.push(bs);
            self.sbs_hist.push(sbs);
        }
    }
}

impl<F: Float> QuasiNewtonOperator<F> for LbfgsOperator<F> {
    fn dim(&self) -> usize {
        self.n
    }

    fn npairs(&self) -> usize {
        self.s_hist.len()
    }

    /// Fold a secant pair into the approximation.
    ///
    /// Returns `Ok(false)` when the pair is skipped for violating the
    /// curvature condition `yᵀs > ε·‖s‖·‖y‖`.
    fn push(&mut self, s: &[F], y: &[F]) -> Result<bool> {
        check_len("s", self.n, s.len())?;
        check_len("y", self.n, y.len())?;
        if self.config.mem == 0 {
            return Ok(false);
        }
        let sy = dot(s, y);
        if sy <= F::epsilon() * norm(s) * norm(y) {
            return Ok(false);
        }
        if self.s_hist.len() == self.config.mem {
            self.s_hist.remove(0);
            self.y_hist.remove(0);
            self.sy_hist.remove(0);
        }
        self.s_hist.push(s.to_vec());
        self.y_hist.push(y.to_vec());
        self.sy_hist.push(sy);
        self.rebuild();
        Ok(true)
    }

    fn reset(&mut self) {
        self.s_hist.clear();
        self.y_hist.clear();
        self.sy_hist.clear();
        self.b_hist.clear();
        self.sbs_hist.clear();
    }
}

impl<F: Float> LinearOperator<F> for LbfgsOperator<F> {
    fn nrows(&self) -> usize {
        self.n
    }

    fn ncols(&self) -> usize {
        self.n
    }

    fn apply_in_place(&mut self, v: &[F], out: &mut [F]) -> Result<()> {
        check_len("v", self.n, v.len())?;
        check_len("out", self.n, out.len())?;
        self.apply_upto(self.s_hist.len(), v, out);
        Ok(())
    }

    fn apply_transpose_in_place(&mut self, v: &[F], out: &mut [F]) -> Result<()> {
        // Symmetric
        self.apply_in_place(v, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_operator_is_scaled_identity() {
        let mut op = LbfgsOperator::new(3, LbfgsConfig { mem: 5, init_scale: 2.0 });
        let out = op.apply(&[1.0, -1.0, 0.5]).unwrap();
        assert_eq!(out, vec![2.0, -2.0, 1.0]);
    }

    #[test]
    fn exact_secant_pairs_reproduce_diagonal_hessian() {
        // f(x) = x1^2 + x2^2 has H = 2I; exact pairs y = H s.
        let mut op = LbfgsOperator::new(2, LbfgsConfig::default());
        assert!(op.push(&[1.0, 0.0], &[2.0, 0.0]).unwrap());
        assert!(op.push(&[0.0, 1.0], &[0.0, 2.0]).unwrap());
        let out = op.apply(&[1.0, 1.0]).unwrap();
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_nonpositive_curvature() {
        let mut op = LbfgsOperator::<f64>::new(2, LbfgsConfig::default());
        assert!(!op.push(&[1.0, 0.0], &[-1.0, 0.0]).unwrap());
        assert_eq!(op.npairs(), 0);
    }

    #[test]
    fn push_checks_dimensions() {
        let mut op = LbfgsOperator::<f64>::new(3, LbfgsConfig::default());
        assert!(op.push(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn memory_budget_evicts_oldest() {
        let mut op = LbfgsOperator::new(2, LbfgsConfig { mem: 2, init_scale: 1.0 });
        assert!(op.push(&[1.0, 0.0], &[3.0, 0.0]).unwrap());
        assert!(op.push(&[0.0, 1.0], &[0.0, 2.0]).unwrap());
        assert!(op.push(&[1.0, 0.0], &[2.0, 0.0]).unwrap());
        assert_eq!(op.npairs(), 2);
        // The surviving pairs are exact secants of diag(2, 2).
        let out = op.apply(&[1.0, 1.0]).unwrap();
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut op = LbfgsOperator::new(2, LbfgsConfig::default());
        op.push(&[1.0, 0.0], &[2.0, 0.0]).unwrap();
        op.reset();
        assert_eq!(op.npairs(), 0);
        assert_eq!(op.apply(&[1.0, 1.0]).unwrap(), vec![1.0, 1.0]);
    }
}
