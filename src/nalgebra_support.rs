//! nalgebra adapters for the modeling interface.
//!
//! Thin wrappers evaluating through the [`NlpModel`] contract and returning
//! `DVector` / `DMatrix`.

use nalgebra::{DMatrix, DVector};

use crate::error::Result;
use crate::float::Float;
use crate::model::NlpModel;
use crate::operator::LinearOperator;

/// Gradient at `x`, returned as a `DVector`.
pub fn grad_nalgebra<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &DVector<F>,
) -> Result<DVector<F>> {
    let g = model.grad(x.as_slice())?;
    Ok(DVector::from_vec(g))
}

/// Dense constraint Jacobian at `x`, returned as an `ncon × nvar` `DMatrix`.
pub fn jac_nalgebra<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &DVector<F>,
) -> Result<DMatrix<F>> {
    let j = model.jac(x.as_slice())?;
    let (ncon, nvar) = (model.meta().ncon, model.meta().nvar);
    let flat: Vec<F> = j.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(ncon, nvar, &flat))
}

/// Dense Lagrangian Hessian at `(x, y)`, returned as a symmetric `DMatrix`.
pub fn hess_nalgebra<F: Float, M: NlpModel<F> + ?Sized>(
    model: &mut M,
    x: &DVector<F>,
    y: Option<&DVector<F>>,
    obj_weight: F,
) -> Result<DMatrix<F>> {
    let h = model.hess(x.as_slice(), y.map(|y| y.as_slice()), obj_weight)?;
    let n = model.meta().nvar;
    let flat: Vec<F> = h.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(n, n, &flat))
}

/// Apply a [`LinearOperator`] to a `DVector`.
pub fn op_apply_nalgebra<F: Float>(
    op: &mut dyn LinearOperator<F>,
    v: &DVector<F>,
) -> Result<DVector<F>> {
    let out = op.apply(v.as_slice())?;
    Ok(DVector::from_vec(out))
}
