//! Tests for the evaluation contract: dimension checks, default assembly
//! of dense/product forms from coordinates, and operator views.

use approx::assert_relative_eq;
use nlpmodel::{
    Counter, Counters, FnModel, LinearOperator, ModelError, ModelMeta, NlpModel, Result,
};

/// Two variables, two constraints:
/// f(x) = (x0 + x1)², c(x) = [x0 + 2·x1, x0·x1].
struct ConstrainedQuadratic {
    meta: ModelMeta<f64>,
    counters: Counters,
}

impl ConstrainedQuadratic {
    fn new() -> Self {
        ConstrainedQuadratic {
            meta: ModelMeta::new(2, 2).with_name("constrained-quadratic").with_nnz(4, 3),
            counters: Counters::new(),
        }
    }
}

impl NlpModel<f64> for ConstrainedQuadratic {
    fn meta(&self) -> &ModelMeta<f64> {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    fn obj(&mut self, x: &[f64]) -> Result<f64> {
        self.meta.check_x("x", x)?;
        self.counters.increment(Counter::Obj);
        let s = x[0] + x[1];
        Ok(s * s)
    }

    fn grad_in_place(&mut self, x: &[f64], g: &mut [f64]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_x("g", g)?;
        self.counters.increment(Counter::Grad);
        let s = 2.0 * (x[0] + x[1]);
        g[0] = s;
        g[1] = s;
        Ok(())
    }

    fn cons_in_place(&mut self, x: &[f64], c: &mut [f64]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_con("c", c)?;
        self.counters.increment(Counter::Cons);
        c[0] = x[0] + 2.0 * x[1];
        c[1] = x[0] * x[1];
        Ok(())
    }

    fn jac_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        Ok((vec![0, 0, 1, 1], vec![0, 1, 0, 1]))
    }

    fn jac_coord_in_place(&mut self, x: &[f64], vals: &mut [f64]) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_nnzj("vals", vals)?;
        self.counters.increment(Counter::JacCoord);
        vals[0] = 1.0;
        vals[1] = 2.0;
        vals[2] = x[1];
        vals[3] = x[0];
        Ok(())
    }

    fn hess_structure(&mut self) -> Result<(Vec<usize>, Vec<usize>)> {
        Ok((vec![0, 1, 1], vec![0, 0, 1]))
    }

    fn hess_coord_in_place(
        &mut self,
        x: &[f64],
        y: Option<&[f64]>,
        obj_weight: f64,
        vals: &mut [f64],
    ) -> Result<()> {
        self.meta.check_x("x", x)?;
        self.meta.check_mult("y", y)?;
        self.meta.check_nnzh("vals", vals)?;
        self.counters.increment(Counter::HessCoord);
        let y1 = y.map_or(0.0, |y| y[1]);
        vals[0] = 2.0 * obj_weight;
        vals[1] = 2.0 * obj_weight + y1;
        vals[2] = 2.0 * obj_weight;
        Ok(())
    }
}

const X: [f64; 2] = [3.0, -1.0];

#[test]
fn objective_and_gradient() {
    let mut model = ConstrainedQuadratic::new();
    assert_relative_eq!(model.obj(&X).unwrap(), 4.0);
    assert_eq!(model.grad(&X).unwrap(), vec![4.0, 4.0]);
    let (f, g) = model.objgrad(&X).unwrap();
    assert_relative_eq!(f, 4.0);
    assert_eq!(g, vec![4.0, 4.0]);
}

#[test]
fn wrong_length_x_is_rejected() {
    let mut model = ConstrainedQuadratic::new();
    let err = model.obj(&[1.0]).unwrap_err();
    assert_eq!(
        err,
        ModelError::DimensionMismatch {
            what: "x",
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn dimension_mismatch_leaves_output_untouched() {
    let mut model = ConstrainedQuadratic::new();
    let mut g = [7.0, 7.0];
    assert!(model.grad_in_place(&[1.0, 2.0, 3.0], &mut g).is_err());
    assert_eq!(g, [7.0, 7.0]);

    let mut jv = [7.0, 7.0];
    assert!(model.jprod_in_place(&X, &[1.0], &mut jv).is_err());
    assert_eq!(jv, [7.0, 7.0]);
}

#[test]
fn dense_jacobian_assembles_from_coordinates() {
    let mut model = ConstrainedQuadratic::new();
    let j = model.jac(&X).unwrap();
    assert_eq!(j[0], vec![1.0, 2.0]);
    assert_eq!(j[1], vec![-1.0, 3.0]);
}

#[test]
fn default_products_match_dense_jacobian() {
    let mut model = ConstrainedQuadratic::new();
    let j = model.jac(&X).unwrap();
    let v = [0.5, -2.0];

    let jv = model.jprod(&X, &v).unwrap();
    for i in 0..2 {
        assert_relative_eq!(jv[i], j[i][0] * v[0] + j[i][1] * v[1]);
    }

    let w = [1.0, 2.0];
    let jtw = model.jtprod(&X, &w).unwrap();
    for i in 0..2 {
        assert_relative_eq!(jtw[i], j[0][i] * w[0] + j[1][i] * w[1]);
    }
}

#[test]
fn dense_hessian_is_symmetric_with_both_triangles() {
    let mut model = ConstrainedQuadratic::new();
    let y = [0.0, 3.0];
    let h = model.hess(&X, Some(&y), 1.0).unwrap();
    assert_relative_eq!(h[0][0], 2.0);
    assert_relative_eq!(h[0][1], 5.0);
    assert_relative_eq!(h[1][0], 5.0);
    assert_relative_eq!(h[1][1], 2.0);
}

#[test]
fn default_hprod_matches_dense_hessian() {
    let mut model = ConstrainedQuadratic::new();
    let y = [1.0, -2.0];
    let v = [1.0, 1.0];
    let h = model.hess(&X, Some(&y), 0.5).unwrap();
    let hv = model.hprod(&X, &v, Some(&y), 0.5).unwrap();
    for i in 0..2 {
        assert_relative_eq!(hv[i], h[i][0] * v[0] + h[i][1] * v[1]);
    }
}

#[test]
fn operator_views_delegate_to_products() {
    let mut model = ConstrainedQuadratic::new();
    let v = [2.0, -1.0];
    let jv = model.jprod(&X, &v).unwrap();
    let w = [1.0, 4.0];
    let jtw = model.jtprod(&X, &w).unwrap();

    let mut jop = model.jac_op(&X).unwrap();
    assert_eq!(jop.apply(&v).unwrap(), jv);
    assert_eq!(jop.apply_transpose(&w).unwrap(), jtw);
    drop(jop);

    let hv = model.hprod(&X, &v, None, 1.0).unwrap();
    let mut hop = model.hess_op(&X, None, 1.0).unwrap();
    assert_eq!(hop.apply(&v).unwrap(), hv);
    assert_eq!(hop.apply_transpose(&v).unwrap(), hv);
}

#[test]
fn unconstrained_model_has_empty_constraint_data() {
    let mut model = FnModel::new(ModelMeta::<f64>::new(2, 0), |x: &[f64]| x[0] * x[1]);
    assert_eq!(model.cons(&[1.0, 2.0]).unwrap(), Vec::<f64>::new());
    let (rows, cols) = model.jac_structure().unwrap();
    assert!(rows.is_empty() && cols.is_empty());
    assert_eq!(model.jac_coord(&[1.0, 2.0]).unwrap(), Vec::<f64>::new());
}

#[test]
fn missing_capabilities_are_reported_as_unsupported() {
    let mut model = FnModel::new(ModelMeta::<f64>::new(2, 1), |x: &[f64]| x[0]);
    assert_eq!(
        model.cons(&[1.0, 2.0]).unwrap_err(),
        ModelError::unsupported("cons")
    );
    assert_eq!(
        model.jac(&[1.0, 2.0]).unwrap_err(),
        ModelError::unsupported("jac_structure")
    );
    assert_eq!(
        model.hprod(&[1.0, 2.0], &[1.0, 0.0], None, 1.0).unwrap_err(),
        ModelError::unsupported("hess_structure")
    );
}

#[test]
fn fn_model_full_stack_matches_hand_written_model() {
    let meta = ModelMeta::<f64>::new(2, 2).with_name("closure-twin");
    let mut closure_model = FnModel::new(meta, |x: &[f64]| {
        let s = x[0] + x[1];
        s * s
    })
    .with_grad(|x, g| {
        let s = 2.0 * (x[0] + x[1]);
        g[0] = s;
        g[1] = s;
    })
    .with_cons(|x, c| {
        c[0] = x[0] + 2.0 * x[1];
        c[1] = x[0] * x[1];
    })
    .with_jac(vec![0, 0, 1, 1], vec![0, 1, 0, 1], |x, vals| {
        vals[0] = 1.0;
        vals[1] = 2.0;
        vals[2] = x[1];
        vals[3] = x[0];
    })
    .unwrap()
    .with_hess(vec![0, 1, 1], vec![0, 0, 1], |_x, y, w, vals| {
        let y1 = y.map_or(0.0, |y| y[1]);
        vals[0] = 2.0 * w;
        vals[1] = 2.0 * w + y1;
        vals[2] = 2.0 * w;
    })
    .unwrap();

    let mut reference = ConstrainedQuadratic::new();
    let y = [0.5, 1.5];

    assert_relative_eq!(closure_model.obj(&X).unwrap(), reference.obj(&X).unwrap());
    assert_eq!(closure_model.grad(&X).unwrap(), reference.grad(&X).unwrap());
    assert_eq!(closure_model.cons(&X).unwrap(), reference.cons(&X).unwrap());
    assert_eq!(closure_model.jac(&X).unwrap(), reference.jac(&X).unwrap());
    assert_eq!(
        closure_model.hess(&X, Some(&y), 1.0).unwrap(),
        reference.hess(&X, Some(&y), 1.0).unwrap()
    );
}
