//! Limited-memory SR1 approximation of a Hessian, applied as an operator.
//!
//! The symmetric rank-one update
//!
//! ```text
//!   B ← B + r rᵀ / (rᵀ s),   r = y − B s
//! ```
//!
//! does not force positive definiteness, so the approximation can capture
//! indefinite curvature — the variant to choose when the true Hessian may
//! have negative eigenvalues. Pairs with `|rᵀs|` too small relative to
//! `‖r‖·‖s‖` are skipped (the standard SR1 safeguard against an exploding
//! update). Only the most recent `mem` pairs are kept.

use crate::error::Result;
use crate::float::Float;
use crate::meta::check_len;
use crate::operator::{dot, norm, LinearOperator};
use crate::quasi_newton::QuasiNewtonOperator;

/// Configuration for [`Lsr1Operator`].
#[derive(Debug, Clone)]
pub struct Lsr1Config<F> {
    /// Number of secant pairs to store (default: 5).
    pub mem: usize,
    /// Initial approximation `B₀ = init_scale · I` (default: 1).
    pub init_scale: F,
}

impl<F: Float> Lsr1Config<F> {
    /// Configuration with the given memory budget and unit initial scale.
    pub fn with_mem(mem: usize) -> Self {
        Lsr1Config {
            mem,
            init_scale: F::one(),
        }
    }
}

impl Default for Lsr1Config<f64> {
    fn default() -> Self {
        Lsr1Config {
            mem: 5,
            init_scale: 1.0,
        }
    }
}

impl Default for Lsr1Config<f32> {
    fn default() -> Self {
        Lsr1Config {
            mem: 5,
            init_scale: 1.0,
        }
    }
}

/// Limited-memory SR1 Hessian approximation.
///
/// Stores the pair history plus, per pair, the precomputed residual
/// `rᵢ = yᵢ − Bᵢ sᵢ` and denominator `rᵢᵀ sᵢ`, so one application costs
/// `O(mem · n)`.
#[derive(Debug, Clone)]
pub struct Lsr1Operator<F> {
    n: usize,
    config: Lsr1Config<F>,
    s_hist: Vec<Vec<F>>,
    y_hist: Vec<Vec<F>>,
    r_hist: Vec<Vec<F>>,
    rs_hist: Vec<F>,
}

impl<F: Float> Lsr1Operator<F> {
    /// Fresh approximation `B = init_scale · I` of dimension `n`.
    pub fn new(n: usize, config: Lsr1Config<F>) -> Self {
        Lsr1Operator {
            n,
            config,
            s_hist: Vec::new(),
            y_hist: Vec::new(),
            r_hist: Vec::new(),
            rs_hist: Vec::new(),
        }
    }

    /// Memory budget.
    pub fn mem(&self) -> usize {
        self.config.mem
    }

    fn safeguard_tol() -> F {
        F::epsilon().sqrt()
    }

    /// Apply the approximation built from the first `k` stored pairs.
    fn apply_upto(&self, k: usize, v: &[F], out: &mut [F]) {
        for (o, &vi) in out.iter_mut().zip(v.iter()) {
            *o = self.config.init_scale * vi;
        }
        for i in 0..k {
            let rv = dot(&self.r_hist[i], v) / self.rs_hist[i];
            for j in 0..self.n {
                out[j] = out[j] + rv * self.r_hist[i][j];
            }
        }
    }

    /// Recompute the residual history after the pair history changes.
    ///
    /// A pair whose denominator fails the safeguard under the rebuilt
    /// prefix (possible after an eviction) is dropped entirely.
    fn rebuild(&mut self) {
        loop {
            self.r_hist.clear();
            self.rs_hist.clear();
            let mut dropped = None;
            for i in 0..self.s_hist.len() {
                let mut bs = vec![F::zero(); self.n];
                self.apply_upto(i, &self.s_hist[i], &mut bs);
                let mut r = vec![F::zero(); self.n];
                for j in 0..self.n {
                    r[j] = self.y_hist[i][j] - bs[j];
                }
                let rs = dot(&r, &self.s_hist[i]);
                if rs.abs() <= Self::safeguard_tol() * norm(&r) * norm(&self.s_hist[i]) {
                    dropped = Some(i);
                    break;
                }
                self.r_hist.push(r);
                self.rs_hist.push(rs);
            }
            match dropped {
                Some(i) => {
                    self.s_hist.remove(i);
                    self.y_hist.remove(i);
                }
                None => break,
            }
        }
    }
}

impl<F: Float> QuasiNewtonOperator<F> for Lsr1Operator<F> {
    fn dim(&self) -> usize {
        self.n
    }

    fn npairs(&self) -> usize {
        self.s_hist.len()
    }

    /// Fold a secant pair into the approximation.
    ///
    /// Returns `Ok(false)` when the pair is skipped by the SR1 safeguard
    /// (`|rᵀs| ≤ √ε·‖r‖·‖s‖` for the current approximation).
    fn push(&mut self, s: &[F], y: &[F]) -> Result<bool> {
        check_len("s", self.n, s.len())?;
        check_len("y", self.n, y.len())?;
        if self.config.mem == 0 {
            return Ok(false);
        }
        let mut bs = vec![F::zero(); self.n];
        self.apply_upto(self.s_hist.len(), s, &mut bs);
        let mut r = vec![F::zero(); self.n];
        for j in 0..self.n {
            r[j] = y[j] - bs[j];
        }
        let rs = dot(&r, s);
        if rs.abs() <= Self::safeguard_tol() * norm(&r) * norm(s) {
            return Ok(false);
        }
        if self.s_hist.len() == self.config.mem {
            self.s_hist.remove(0);
            self.y_hist.remove(0);
        }
        self.s_hist.push(s.to_vec());
        self.y_hist.push(y.to_vec());
        self.rebuild();
        Ok(true)
    }

    fn reset(&mut self) {
        self.s_hist.clear();
        self.y_hist.clear();
        self.r_hist.clear();
        self.rs_hist.clear();
    }
}

impl<F: Float> LinearOperator<F> for Lsr1Operator<F> {
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
