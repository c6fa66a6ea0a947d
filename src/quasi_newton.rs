//! Quasi-Newton model wrappers: the full evaluation contract with a
//! maintained curvature approximation standing in for the true Hessian.
//!
//! [`QuasiNewtonModel`] forwards every non-Hessian primitive verbatim to
//! the wrapped model and answers the Hessian family from an operator that
//! accumulates secant pairs supplied by the optimization driver. The two
//! approximation families are [`LbfgsModel`] (positive definite) and
//! [`Lsr1Model`] (symmetric, indefinite-safe).

use crate::counters::Counters;
use crate::error::{ModelError, Result};
use crate::float::Float;
use crate::lbfgs::{LbfgsConfig, LbfgsOperator};
use crate::lsr1::{Lsr1Config, Lsr1Operator};
use crate::meta::ModelMeta;
use crate::model::NlpModel;
use crate::operator::LinearOperator;

/// A curvature approximation maintained across evaluation points.
///
/// Beyond plain operator application, it accepts incremental `(step,
/// gradient-difference)` updates and can be reset to its initial state.
pub trait QuasiNewtonOperator<F: Float>: LinearOperator<F> {
    /// Operator dimension (square).
    fn dim(&self) -> usize;

    /// Number of secant pairs currently held.
    fn npairs(&self) -> usize;

    /// Fold a secant pair into the approximation, evicting the oldest
    /// pair when the memory budget is exceeded.
    ///
    /// Returns `Ok(false)` when the update rule's own safeguard rejects
    /// the pair. Fails on wrong-length vectors.
    fn push(&mut self, s: &[F], y: &[F]) -> Result<bool>;

    /// Clear the accumulated history, restoring the freshly-constructed
    /// approximation.
    fn reset(&mut self);
}

/// A model whose Hessian is a maintained quasi-Newton approximation.
///
/// Everything except the Hessian family is forwarded verbatim to the
/// wrapped model — results and counter increments are identical to calling
/// the wrapped model directly. Hessian coordinate, structure, and dense
/// forms are unsupported: the approximation has no fixed sparsity pattern
/// to expose.
pub struct QuasiNewtonModel<F, M, O> {
    meta: ModelMeta<F>,
    inner: M,
    op: O,
}

impl<F: Float, M, O: std::fmt::Debug> std::fmt::Debug for QuasiNewtonModel<F, M, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuasiNewtonModel")
            .field("meta", &self.meta)
            .field("op", &self.op)
            .finish_non_exhaustive()
    }
}

/// Quasi-Newton model with a positive-definite L-BFGS approximation.
pub type LbfgsModel<F, M> = QuasiNewtonModel<F, M, LbfgsOperator<F>>;

/// Quasi-Newton model with an indefinite-safe L-SR1 approximation.
pub type Lsr1Model<F, M> = QuasiNewtonModel<F, M, Lsr1Operator<F>>;

impl<F: Float, M: NlpModel<F>, O: QuasiNewtonOperator<F>> QuasiNewtonModel<F, M, O> {
    /// Wrap `inner`, substituting `op` for its Hessian.
    ///
    /// Fails if the wrapped model has no variables or the operator
    /// dimension disagrees with it.
    pub fn new(inner: M, op: O) -> Result<Self> {
        let meta = inner.meta().clone();
        if meta.nvar == 0 {
            return Err(ModelError::NoVariables);
        }
        if op.dim() != meta.nvar {
            return Err(ModelError::DimensionMismatch {
                what: "operator dimension",
                expected: meta.nvar,
                actual: op.dim(),
            });
        }
        Ok(QuasiNewtonModel { meta, inner, op })
    }

    /// Append a `(step, gradient-difference)` pair to the approximation.
    ///
    /// Forwarded unchanged to the operator; returns whether the pair was
    /// retained.
    pub fn push_pair(&mut self, s: &[F], y: &[F]) -> Result<bool> {
        self.op.push(s, y)
    }

    /// Clear the operator's curvature history.
    ///
    /// The wrapped model — its counters included — is untouched; reset it
    /// separately if needed.
    pub fn reset_approximation(&mut self) {
        self.op.reset();
    }

    /// The maintained approximation.
    pub fn operator(&self) -> &O {
        &self.op
    }

    /// Mutable access to the maintained approximation.
    pub fn operator_mut(&mut self) -> &mut O {
        &mut self.op
    }

    /// The wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Mutable access to the wrapped model.
    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    /// Unwrap, discarding the approximation.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<F: Float, M: NlpModel<F>> LbfgsModel<F, M> {
    /// Wrap `inner` with a fresh L-BFGS approximation.
    pub fn lbfgs(inner: M, config: LbfgsConfig<F>) -> Result<Self> {
        let n = inner.meta().nvar;
        Self::new(inner, LbfgsOperator::new(n, config))
    }
}

impl<F: Float, M: NlpModel<F>> Lsr1Model<F, M> {
    /// Wrap `inner` with a fresh L-SR1 approximation.
    pub fn lsr1(inner: M, config: Lsr1Config<F>) -> Result<Self> {
        let n = inner.meta().nvar;
        Self::new(inner, Lsr1Operator::new(n, config))
    }
}

impl<F: Float, M: NlpModel<F>, O: QuasiNewtonOperator<F>> NlpModel<F>
    for QuasiNewtonModel<F, M, O>
{
    fn meta(&self) -> &ModelMeta<F> {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        self.inner.counters()
    }

    fn counters_mut(&mut self) -> &mut Counters {
        self.inner.counters_mut()
    }

    // ── Forwarded primitives ──

    fn obj(&mut self, x: &[F]) -> Result<F> {
        self.inner.obj(x)
    }

    fn grad_in_place(&mut self, x: &[F], g: &mut [F]) -> Result<()> {
        self.inner.grad_in_place(x, g)
    }

    fn grad(&mut self, x: &[F]) -> Result<Vec<F>> {
        self.inner.grad(x)
    }

    fn objgrad(&mut self, x: &[F]) -> Result<(F, Vec<F>)> {
        self.inner.objgrad(x)
    }

    fn cons_in_place(&mut self, x: &[F], c: &mut [F]) -> Result<()> {
        self.inner.cons_in_place(x, c)
    }

    fn cons(&mut self, x: &[F]) -> Result<Vec<F>> {
        self.inner.cons(x)
    }

    fn jac_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        self.inner.jac_structure()
    }

    fn jac_coord_in_place(&mut self, x: &[F], vals: &mut [F]) -> Result<()> {
        self.inner.jac_coord_in_place(x, vals)
    }

    fn jac_coord(&mut self, x: &[F]) -> Result<Vec<F>> {
        self.inner.jac_coord(x)
    }

    fn jac(&mut self, x: &[F]) -> Result<Vec<Vec<F>>> {
        self.inner.jac(x)
    }

    fn jprod_in_place(&mut self, x: &[F], v: &[F], jv: &mut [F]) -> Result<()> {
        self.inner.jprod_in_place(x, v, jv)
    }

    fn jprod(&mut self, x: &[F], v: &[F]) -> Result<Vec<F>> {
        self.inner.jprod(x, v)
    }

    fn jtprod_in_place(&mut self, x: &[F], v: &[F], jtv: &mut [F]) -> Result<()> {
        self.inner.jtprod_in_place(x, v, jtv)
    }

    fn jtprod(&mut self, x: &[F], v: &[F]) -> Result<Vec<F>> {
        self.inner.jtprod(x, v)
    }

    fn jac_op<'a>(&'a mut self, x: &[F]) -> Result<Box<dyn LinearOperator<F> + 'a>> {
        self.inner.jac_op(x)
    }

    // ── Hessian substitution ──

    fn hess_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        Err(ModelError::unsupported("hess_structure"))
    }

    fn hess_coord_in_place(
        &mut self,
        _x: &[F],
        _y: Option<&[F]>,
        _obj_weight: F,
        _vals: &mut [F],
    ) -> Result<()> {
        Err(ModelError::unsupported("hess_coord"))
    }

    fn hess(&mut self, _x: &[F], _y: Option<&[F]>, _obj_weight: F) -> Result<Vec<Vec<F>>> {
        Err(ModelError::unsupported("hess"))
    }

    /// Apply the maintained approximation to `v`.
    ///
    /// Multipliers and objective weight are ignored: the approximation
    /// tracks accumulated curvature, not a point evaluation. No wrapped
    /// evaluation occurs, so no counter advances.
    fn hprod_in_place(
        &mut self,
        x: &[F],
        v: &[F],
        _y: Option<&[F]>,
        _obj_weight: F,
        hv: &mut [F],
    ) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.op.apply_in_place(v, hv)
    }

    /// The maintained approximation itself. Independent of `x`.
    fn hess_op<'a>(
        &'a mut self,
        x: &[F],
        _y: Option<&[F]>,
        _obj_weight: F,
    ) -> Result<Box<dyn LinearOperator<F> + 'a>> {
        self.meta.check_x("x", x)?;
        Ok(Box::new(&mut self.op))
    }
}
