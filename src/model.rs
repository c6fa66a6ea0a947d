//! The capability contract every concrete optimization model implements.
//!
//! A model is a nonlinear program
//!
//! ```text
//!    min  f(x)    s.t.  lcon ≤ c(x) ≤ ucon,  lvar ≤ x ≤ uvar
//! ```
//!
//! exposed to generic algorithms through evaluation primitives: objective,
//! gradient, constraints, and Jacobian/Hessian in structure, coordinate,
//! dense, and operator form. The Hessian is always that of the weighted
//! Lagrangian `obj_weight·f(x) + yᵀc(x)`, lower triangle in coordinate form.
//!
//! # Implementing the trait
//!
//! `obj` and the accessors are required; everything else defaults to a
//! ["capability not supported"](crate::error::ModelError::Unsupported)
//! error or to assembly from another primitive. Implementations must
//! dimension-check their arguments (the [`ModelMeta`] helpers) before
//! writing to any output buffer, and must increment exactly one counter
//! per primitive evaluation. Provided defaults never touch counters:
//! work they delegate is counted by the primitive that performs it, so no
//! compensating decrements are ever needed.

use crate::counters::Counters;
use crate::error::{ModelError, Result};
use crate::float::Float;
use crate::meta::ModelMeta;
use crate::operator::{HessianOp, JacobianOp, LinearOperator};

/// Evaluation contract for nonlinear programming models.
///
/// Methods take `&mut self` to allow caching, counter updates, and internal
/// buffers.
pub trait NlpModel<F: Float> {
    /// Problem dimensions and bounds, fixed at construction.
    fn meta(&self) -> &ModelMeta<F>;

    /// Evaluation tallies for this model.
    fn counters(&self) -> &Counters;

    /// Mutable access to the tallies.
    fn counters_mut(&mut self) -> &mut Counters;

    /// Zero all tallies. Model numerical state is untouched.
    fn reset_counters(&mut self) {
        self.counters_mut().reset();
    }

    // ── Objective ──

    /// Objective value `f(x)`.
    fn obj(&mut self, x: &[F]) -> Result<F>;

    /// Gradient `∇f(x)` written into `g`.
    fn grad_in_place(&mut self, x: &[F], g: &mut [F]) -> Result<()> {
        let _ = (x, g);
        Err(ModelError::unsupported("grad"))
    }

    /// Allocating form of [`grad_in_place`](NlpModel::grad_in_place).
    fn grad(&mut self, x: &[F]) -> Result<Vec<F>> {
        let mut g = vec![F::zero(); self.meta().nvar];
        self.grad_in_place(x, &mut g)?;
        Ok(g)
    }

    /// Objective and gradient together: `(f(x), ∇f(x))`.
    fn objgrad(&mut self, x: &[F]) -> Result<(F, Vec<F>)> {
        let f = self.obj(x)?;
        let g = self.grad(x)?;
        Ok((f, g))
    }

    // ── Constraints ──

    /// Constraint values `c(x)` written into `c`.
    ///
    /// The default accepts unconstrained models (`ncon == 0`) and reports
    /// the capability as unsupported otherwise.
    fn cons_in_place(&mut self, x: &[F], c: &mut [F]) -> Result<()> {
        self.meta().check_x("x", x)?;
        self.meta().check_con("c", c)?;
        if self.meta().ncon == 0 {
            return Ok(());
        }
        Err(ModelError::unsupported("cons"))
    }

    /// Allocating form of [`cons_in_place`](NlpModel::cons_in_place).
    fn cons(&mut self, x: &[F]) -> Result<Vec<F>> {
        let mut c = vec![F::zero(); self.meta().ncon];
        self.cons_in_place(x, &mut c)?;
        Ok(c)
    }

    // ── Jacobian ──

    /// Sparsity structure of the constraint Jacobian: `(rows, cols)`,
    /// each of length `nnzj`. Indices must be in range; they are trusted
    /// by the assembly defaults.
    fn jac_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        if self.meta().ncon == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        Err(ModelError::unsupported("jac_structure"))
    }

    /// Jacobian values at `x` in the order of
    /// [`jac_structure`](NlpModel::jac_structure), written into `vals`.
    fn jac_coord_in_place(&mut self, x: &[F], vals: &mut [F]) -> Result<()> {
        self.meta().check_x("x", x)?;
        self.meta().check_nnzj("vals", vals)?;
        if self.meta().ncon == 0 {
            return Ok(());
        }
        Err(ModelError::unsupported("jac_coord"))
    }

    /// Allocating form of [`jac_coord_in_place`](NlpModel::jac_coord_in_place).
    fn jac_coord(&mut self, x: &[F]) -> Result<Vec<F>> {
        let mut vals = vec![F::zero(); self.meta().nnzj];
        self.jac_coord_in_place(x, &mut vals)?;
        Ok(vals)
    }

    /// Dense Jacobian, `ncon × nvar`, assembled from the coordinate form.
    /// Duplicate coordinates are summed.
    fn jac(&mut self, x: &[F]) -> Result<Vec<Vec<F>>> {
        let (rows, cols) = self.jac_structure()?;
        let vals = self.jac_coord(x)?;
        let (nvar, ncon) = (self.meta().nvar, self.meta().ncon);
        let mut j = vec![vec![F::zero(); nvar]; ncon];
        for k in 0..vals.len() {
            j[rows[k]][cols[k]] = j[rows[k]][cols[k]] + vals[k];
        }
        Ok(j)
    }

    /// Jacobian-vector product `J(x)·v` written into `jv`.
    ///
    /// The default assembles from the coordinate form; models with a
    /// cheaper matrix-free product should override it.
    fn jprod_in_place(&mut self, x: &[F], v: &[F], jv: &mut [F]) -> Result<()> {
        self.meta().check_x("v", v)?;
        self.meta().check_con("jv", jv)?;
        let (rows, cols) = self.jac_structure()?;
        let vals = self.jac_coord(x)?;
        for out in jv.iter_mut() {
            *out = F::zero();
        }
        for k in 0..vals.len() {
            jv[rows[k]] = jv[rows[k]] + vals[k] * v[cols[k]];
        }
        Ok(())
    }

    /// Allocating form of [`jprod_in_place`](NlpModel::jprod_in_place).
    fn jprod(&mut self, x: &[F], v: &[F]) -> Result<Vec<F>> {
        let mut jv = vec![F::zero(); self.meta().ncon];
        self.jprod_in_place(x, v, &mut jv)?;
        Ok(jv)
    }

    /// Transpose product `J(x)ᵀ·v` written into `jtv`.
    fn jtprod_in_place(&mut self, x: &[F], v: &[F], jtv: &mut [F]) -> Result<()> {
        self.meta().check_con("v", v)?;
        self.meta().check_x("jtv", jtv)?;
        let (rows, cols) = self.jac_structure()?;
        let vals = self.jac_coord(x)?;
        for out in jtv.iter_mut() {
            *out = F::zero();
        }
        for k in 0..vals.len() {
            jtv[cols[k]] = jtv[cols[k]] + vals[k] * v[rows[k]];
        }
        Ok(())
    }

    /// Allocating form of [`jtprod_in_place`](NlpModel::jtprod_in_place).
    fn jtprod(&mut self, x: &[F], v: &[F]) -> Result<Vec<F>> {
        let mut jtv = vec![F::zero(); self.meta().nvar];
        self.jtprod_in_place(x, v, &mut jtv)?;
        Ok(jtv)
    }

    /// Operator view of the Jacobian at `x`; applications delegate to
    /// [`jprod_in_place`](NlpModel::jprod_in_place) and
    /// [`jtprod_in_place`](NlpModel::jtprod_in_place).
    fn jac_op<'a>(&'a mut self, x: &[F]) -> Result<Box<dyn LinearOperator<F> + 'a>>
    where
        Self: Sized,
    {
        Ok(Box::new(JacobianOp::new(self, x)?))
    }

    // ── Hessian ──

    /// Sparsity structure of the lower triangle of the Lagrangian Hessian:
    /// `(rows, cols)`, each of length `nnzh`, with `cols[k] <= rows[k]`.
    fn hess_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        Err(ModelError::unsupported("hess_structure"))
    }

    /// Lower-triangle Hessian values of `obj_weight·f + yᵀc` at `x`, in
    /// the order of [`hess_structure`](NlpModel::hess_structure).
    fn hess_coord_in_place(
        &mut self,
        x: &[F],
        y: Option<&[F]>,
        obj_weight: F,
        vals: &mut [F],
    ) -> Result<()> {
        let _ = (x, y, obj_weight, vals);
        Err(ModelError::unsupported("hess_coord"))
    }

    /// Allocating form of [`hess_coord_in_place`](NlpModel::hess_coord_in_place).
    fn hess_coord(&mut self, x: &[F], y: Option<&[F]>, obj_weight: F) -> Result<Vec<F>> {
        let mut vals = vec![F::zero(); self.meta().nnzh];
        self.hess_coord_in_place(x, y, obj_weight, &mut vals)?;
        Ok(vals)
    }

    /// Dense symmetric Hessian, both triangles filled, assembled from the
    /// coordinate form.
    fn hess(&mut self, x: &[F], y: Option<&[F]>, obj_weight: F) -> Result<Vec<Vec<F>>> {
        let (rows, cols) = self.hess_structure()?;
        let vals = self.hess_coord(x, y, obj_weight)?;
        let n = self.meta().nvar;
        let mut h = vec![vec![F::zero(); n]; n];
        for k in 0..vals.len() {
            let (r, c) = (rows[k], cols[k]);
            h[r][c] = h[r][c] + vals[k];
            if r != c {
                h[c][r] = h[c][r] + vals[k];
            }
        }
        Ok(h)
    }

    /// Hessian-vector product `H(x, y)·v` written into `hv`.
    ///
    /// The default assembles from the coordinate form, mirroring the lower
    /// triangle.
    fn hprod_in_place(
        &mut self,
        x: &[F],
        v: &[F],
        y: Option<&[F]>,
        obj_weight: F,
        hv: &mut [F],
    ) -> Result<()> {
        self.meta().check_x("v", v)?;
        self.meta().check_x("hv", hv)?;
        let (rows, cols) = self.hess_structure()?;
        let vals = self.hess_coord(x, y, obj_weight)?;
        for out in hv.iter_mut() {
            *out = F::zero();
        }
        for k in 0..vals.len() {
            let (r, c) = (rows[k], cols[k]);
            hv[r] = hv[r] + vals[k] * v[c];
            if r != c {
                hv[c] = hv[c] + vals[k] * v[r];
            }
        }
        Ok(())
    }

    /// Allocating form of [`hprod_in_place`](NlpModel::hprod_in_place).
    fn hprod(&mut self, x: &[F], v: &[F], y: Option<&[F]>, obj_weight: F) -> Result<Vec<F>> {
        let mut hv = vec![F::zero(); self.meta().nvar];
        self.hprod_in_place(x, v, y, obj_weight, &mut hv)?;
        Ok(hv)
    }

    /// Operator view of the Hessian at `(x, y)`; applications delegate to
    /// [`hprod_in_place`](NlpModel::hprod_in_place).
    fn hess_op<'a>(
        &'a mut self,
        x: &[F],
        y: Option<&[F]>,
        obj_weight: F,
    ) -> Result<Box<dyn LinearOperator<F> + 'a>>
    where
        Self: Sized,
    {
        Ok(Box::new(HessianOp::new(self, x, y, obj_weight)?))
    }
}
