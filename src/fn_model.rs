//! Closure-backed model: define a problem from plain functions, without
//! writing a struct and trait implementation by hand.

use crate::counters::{Counter, Counters};
use crate::error::{ModelError, Result};
use crate::float::Float;
use crate::meta::{check_len, ModelMeta};
use crate::model::NlpModel;

type ObjFn<F> = Box<dyn FnMut(&[F]) -> F>;
type VecFn<F> = Box<dyn FnMut(&[F], &mut [F])>;
type HessFn<F> = Box<dyn FnMut(&[F], Option<&[F]>, F, &mut [F])>;

/// An [`NlpModel`] assembled from closures.
///
/// Only the objective is mandatory; gradient, constraints, and coordinate
/// Jacobian/Hessian are attached with the `with_*` builders. Primitives
/// without an attached closure report
/// [`Unsupported`](crate::error::ModelError::Unsupported). Closures receive
/// dimension-checked arguments and write into pre-sized buffers.
///
/// ```
/// use nlpmodel::{FnModel, ModelMeta, NlpModel};
///
/// let meta = ModelMeta::<f64>::new(2, 0);
/// let mut model = FnModel::new(meta, |x: &[f64]| x[0] * x[0] + x[1] * x[1])
///     .with_grad(|x, g| {
///         g[0] = 2.0 * x[0];
///         g[1] = 2.0 * x[1];
///     });
/// assert_eq!(model.obj(&[3.0, 4.0]).unwrap(), 25.0);
/// assert_eq!(model.grad(&[3.0, 4.0]).unwrap(), vec![6.0, 8.0]);
/// ```
pub struct FnModel<F: Float> {
    meta: ModelMeta<F>,
    counters: Counters,
    obj_fn: ObjFn<F>,
    grad_fn: Option<VecFn<F>>,
    cons_fn: Option<VecFn<F>>,
    jac_rows: Vec<usize>,
    jac_cols: Vec<usize>,
    jac_fn: Option<VecFn<F>>,
    hess_rows: Vec<usize>,
    hess_cols: Vec<usize>,
    hess_fn: Option<HessFn<F>>,
}

impl<F: Float> std::fmt::Debug for FnModel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModel")
            .field("meta", &self.meta)
            .field("counters", &self.counters)
            .field("has_grad", &self.grad_fn.is_some())
            .field("has_cons", &self.cons_fn.is_some())
            .field("jac_rows", &self.jac_rows)
            .field("jac_cols", &self.jac_cols)
            .field("has_jac", &self.jac_fn.is_some())
            .field("hess_rows", &self.hess_rows)
            .field("hess_cols", &self.hess_cols)
            .field("has_hess", &self.hess_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl<F: Float> FnModel<F> {
    /// Model with the given metadata and objective closure.
    pub fn new(meta: ModelMeta<F>, obj: impl FnMut(&[F]) -> F + 'static) -> Self {
        FnModel {
            meta,
            counters: Counters::new(),
            obj_fn: Box::new(obj),
            grad_fn: None,
            cons_fn: None,
            jac_rows: Vec::new(),
            jac_cols: Vec::new(),
            jac_fn: None,
            hess_rows: Vec::new(),
            hess_cols: Vec::new(),
            hess_fn: None,
        }
    }

    /// Attach a gradient closure writing `∇f(x)` into its second argument.
    pub fn with_grad(mut self, grad: impl FnMut(&[F], &mut [F]) + 'static) -> Self {
        self.grad_fn = Some(Box::new(grad));
        self
    }

    /// Attach a constraint closure writing `c(x)` into its second argument.
    pub fn with_cons(mut self, cons: impl FnMut(&[F], &mut [F]) + 'static) -> Self {
        self.cons_fn = Some(Box::new(cons));
        self
    }

    /// Attach the Jacobian sparsity structure and coordinate closure.
    ///
    /// Updates `nnzj` to the structure length. Fails on mismatched index
    /// vectors or out-of-range indices.
    pub fn with_jac(
        mut self,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: impl FnMut(&[F], &mut [F]) + 'static,
    ) -> Result<Self> {
        check_len("cols", rows.len(), cols.len())?;
        for &r in &rows {
            if r >= self.meta.ncon {
                return Err(ModelError::DimensionMismatch {
                    what: "jacobian row index",
                    expected: self.meta.ncon,
                    actual: r,
                });
            }
        }
        for &c in &cols {
            if c >= self.meta.nvar {
                return Err(ModelError::DimensionMismatch {
                    what: "jacobian col index",
                    expected: self.meta.nvar,
                    actual: c,
                });
            }
        }
        self.meta.nnzj = rows.len();
        self.jac_rows = rows;
        self.jac_cols = cols;
        self.jac_fn = Some(Box::new(vals));
        Ok(self)
    }

    /// Attach the Hessian lower-triangle structure and coordinate closure.
    ///
    /// The closure receives `(x, y, obj_weight, vals)` for the weighted
    /// Lagrangian. Updates `nnzh` to the structure length. Fails on
    /// mismatched index vectors, out-of-range indices, or entries above
    /// the diagonal.
    pub fn with_hess(
        mut self,
        rows: Vec<usize>,
        cols: Vec<usize>,
        vals: impl FnMut(&[F], Option<&[F]>, F, &mut [F]) + 'static,
    ) -> Result<Self> {
        check_len("cols", rows.len(), cols.len())?;
        for (&r, &c) in rows.iter().zip(cols.iter()) {
            if r >= self.meta.nvar {
                return Err(ModelError::DimensionMismatch {
                    what: "hessian row index",
                    expected: self.meta.nvar,
                    actual: r,
                });
            }
            if c > r {
                return Err(ModelError::DimensionMismatch {
                    what: "hessian lower-triangle col index",
                    expected: r,
                    actual: c,
                });
            }
        }
        self.meta.nnzh = rows.len();
        self.hess_rows = rows;
        self.hess_cols = cols;
        self.hess_fn = Some(Box::new(vals));
        Ok(self)
    }
}

impl<F: Float> NlpModel<F> for FnModel<F> {
    fn meta(&self) -> &ModelMeta<F> {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    fn obj(&mut self, x: &[F]) -> Result<F> {
        self.meta.check_x("x", x)?;
        self.counters.increment(Counter::Obj);
        Ok((self.obj_fn)(x))
    }

    fn grad_in_place(&mut self, x: &[F], g: &mut [F]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_x("g", g)?;
        match self.grad_fn.as_mut() {
            Some(grad) => {
                self.counters.increment(Counter::Grad);
                grad(x, g);
                Ok(())
            }
            None => Err(ModelError::unsupported("grad")),
        }
    }

    fn cons_in_place(&mut self, x: &[F], c: &mut [F]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_con("c", c)?;
        if self.meta.ncon == 0 {
            return Ok(());
        }
        match self.cons_fn.as_mut() {
            Some(cons) => {
                self.counters.increment(Counter::Cons);
                cons(x, c);
                Ok(())
            }
            None => Err(ModelError::unsupported("cons")),
        }
    }

    fn jac_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        if self.meta.ncon == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        if self.jac_fn.is_some() {
            Ok((self.jac_rows.clone(), self.jac_cols.clone()))
        } else {
            Err(ModelError::unsupported("jac_structure"))
        }
    }

    fn jac_coord_in_place(&mut self, x: &[F], vals: &mut [F]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_nnzj("vals", vals)?;
        if self.meta.ncon == 0 {
            return Ok(());
        }
        match self.jac_fn.as_mut() {
            Some(jac) => {
                self.counters.increment(Counter::JacCoord);
                jac(x, vals);
                Ok(())
            }
            None => Err(ModelError::unsupported("jac_coord")),
        }
    }

    fn hess_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        if self.hess_fn.is_some() {
            Ok((self.hess_rows.clone(), self.hess_cols.clone()))
        } else {
            Err(ModelError::unsupported("hess_structure"))
        }
    }

    fn hess_coord_in_place(
        &mut self,
        x: &[F],
        y: Option<&[F]>,
        obj_weight: F,
        vals: &mut [F],
    ) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_mult("y", y)?;
        self.meta.check_nnzh("vals", vals)?;
        match self.hess_fn.as_mut() {
            Some(hess) => {
                self.counters.increment(Counter::HessCoord);
                hess(x, y, obj_weight, vals);
                Ok(())
            }
            None => Err(ModelError::unsupported("hess_coord")),
        }
    }
}
