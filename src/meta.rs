//! Immutable per-problem metadata: dimensions, nonzero counts, bounds.

use crate::error::{ModelError, Result};
use crate::float::Float;

/// Dimensions and bounds of a nonlinear program, fixed at model construction.
///
/// The convention throughout the crate: `nvar` variables, `ncon` constraints,
/// Jacobian stored as `nnzj` coordinate triples, Hessian stored as `nnzh`
/// coordinate triples over the lower triangle (including the diagonal).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelMeta<F> {
    /// Problem name, for diagnostics.
    pub name: String,
    /// Number of variables.
    pub nvar: usize,
    /// Number of constraints.
    pub ncon: usize,
    /// Number of nonzeros in the constraint Jacobian.
    pub nnzj: usize,
    /// Number of nonzeros in the lower triangle of the Lagrangian Hessian.
    pub nnzh: usize,
    /// Suggested initial point, length `nvar`.
    pub x0: Vec<F>,
    /// Variable lower bounds, length `nvar`.
    pub lvar: Vec<F>,
    /// Variable upper bounds, length `nvar`.
    pub uvar: Vec<F>,
    /// Constraint lower bounds, length `ncon`.
    pub lcon: Vec<F>,
    /// Constraint upper bounds, length `ncon`.
    pub ucon: Vec<F>,
}

impl<F: Float> ModelMeta<F> {
    /// Metadata for an `nvar`-variable, `ncon`-constraint problem.
    ///
    /// Defaults: dense nonzero counts (`nnzj = ncon·nvar`,
    /// `nnzh = nvar·(nvar+1)/2`), unbounded variables and constraints,
    /// zero initial point.
    pub fn new(nvar: usize, ncon: usize) -> Self {
        ModelMeta {
            name: String::from("generic"),
            nvar,
            ncon,
            nnzj: ncon * nvar,
            nnzh: nvar * (nvar + 1) / 2,
            x0: vec![F::zero(); nvar],
            lvar: vec![F::neg_infinity(); nvar],
            uvar: vec![F::infinity(); nvar],
            lcon: vec![F::neg_infinity(); ncon],
            ucon: vec![F::infinity(); ncon],
        }
    }

    /// Set the problem name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the initial point. Fails if `x0` does not have length `nvar`.
    pub fn with_x0(mut self, x0: &[F]) -> Result<Self> {
        self.check_x("x0", x0)?;
        self.x0 = x0.to_vec();
        Ok(self)
    }

    /// Set variable bounds. Fails on wrong-length slices.
    pub fn with_var_bounds(mut self, lvar: &[F], uvar: &[F]) -> Result<Self> {
        self.check_x("lvar", lvar)?;
        self.check_x("uvar", uvar)?;
        self.lvar = lvar.to_vec();
        self.uvar = uvar.to_vec();
        Ok(self)
    }

    /// Set constraint bounds. Fails on wrong-length slices.
    pub fn with_con_bounds(mut self, lcon: &[F], ucon: &[F]) -> Result<Self> {
        self.check_con("lcon", lcon)?;
        self.check_con("ucon", ucon)?;
        self.lcon = lcon.to_vec();
        self.ucon = ucon.to_vec();
        Ok(self)
    }

    /// Override the Jacobian and Hessian nonzero counts (sparse problems).
    pub fn with_nnz(mut self, nnzj: usize, nnzh: usize) -> Self {
        self.nnzj = nnzj;
        self.nnzh = nnzh;
        self
    }

    /// Check that a variable-space vector has length `nvar`.
    pub fn check_x(&self, what: &'static str, v: &[F]) -> Result<()> {
        check_len(what, self.nvar, v.len())
    }

    /// Check that a constraint-space vector has length `ncon`.
    pub fn check_con(&self, what: &'static str, v: &[F]) -> Result<()> {
        check_len(what, self.ncon, v.len())
    }

    /// Check that a multiplier vector, when given, has length `ncon`.
    pub fn check_mult(&self, what: &'static str, y: Option<&[F]>) -> Result<()> {
        match y {
            Some(y) => check_len(what, self.ncon, y.len()),
            None => Ok(()),
        }
    }

    /// Check that a Jacobian coordinate buffer has length `nnzj`.
    pub fn check_nnzj(&self, what: &'static str, v: &[F]) -> Result<()> {
        check_len(what, self.nnzj, v.len())
    }

    /// Check that a Hessian coordinate buffer has length `nnzh`.
    pub fn check_nnzh(&self, what: &'static str, v: &[F]) -> Result<()> {
        check_len(what, self.nnzh, v.len())
    }
}

/// Length check shared by all metadata helpers.
pub fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
