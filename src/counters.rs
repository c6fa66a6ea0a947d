//! Evaluation counters: one tally per primitive, owned by each model.

/// Names of the countable evaluation primitives.
///
/// Dense, coordinate, and product forms are counted separately so a driver
/// can see exactly which primitives a solver leans on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Counter {
    /// Objective value.
    Obj,
    /// Objective gradient.
    Grad,
    /// Constraint values.
    Cons,
    /// Dense Jacobian.
    Jac,
    /// Jacobian coordinate values.
    JacCoord,
    /// Jacobian-vector product.
    Jprod,
    /// Transpose Jacobian-vector product.
    Jtprod,
    /// Dense Hessian.
    Hess,
    /// Hessian coordinate values.
    HessCoord,
    /// Hessian-vector product.
    Hprod,
}

impl Counter {
    /// Every counter name, in declaration order.
    pub const ALL: [Counter; 10] = [
        Counter::Obj,
        Counter::Grad,
        Counter::Cons,
        Counter::Jac,
        Counter::JacCoord,
        Counter::Jprod,
        Counter::Jtprod,
        Counter::Hess,
        Counter::HessCoord,
        Counter::Hprod,
    ];

    /// Human-readable name, matching the trait method it counts.
    pub fn name(self) -> &'static str {
        match self {
            Counter::Obj => "obj",
            Counter::Grad => "grad",
            Counter::Cons => "cons",
            Counter::Jac => "jac",
            Counter::JacCoord => "jac_coord",
            Counter::Jprod => "jprod",
            Counter::Jtprod => "jtprod",
            Counter::Hess => "hess",
            Counter::HessCoord => "hess_coord",
            Counter::Hprod => "hprod",
        }
    }
}

/// Per-model evaluation tallies.
///
/// Owned exclusively by its model and incremented by the model's own
/// primitive implementations — one increment per primitive evaluation.
/// Resetting the counters never touches model numerical state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    /// Objective evaluations.
    pub obj: usize,
    /// Gradient evaluations.
    pub grad: usize,
    /// Constraint evaluations.
    pub cons: usize,
    /// Dense Jacobian evaluations.
    pub jac: usize,
    /// Jacobian coordinate evaluations.
    pub jac_coord: usize,
    /// Jacobian-vector products.
    pub jprod: usize,
    /// Transpose Jacobian-vector products.
    pub jtprod: usize,
    /// Dense Hessian evaluations.
    pub hess: usize,
    /// Hessian coordinate evaluations.
    pub hess_coord: usize,
    /// Hessian-vector products.
    pub hprod: usize,
}

impl Counters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Counters::default()
    }

    fn field_mut(&mut self, c: Counter) -> &mut usize {
        match c {
            Counter::Obj => &mut self.obj,
            Counter::Grad => &mut self.grad,
            Counter::Cons => &mut self.cons,
            Counter::Jac => &mut self.jac,
            Counter::JacCoord => &mut self.jac_coord,
            Counter::Jprod => &mut self.jprod,
            Counter::Jtprod => &mut self.jtprod,
            Counter::Hess => &mut self.hess,
            Counter::HessCoord => &mut self.hess_coord,
            Counter::Hprod => &mut self.hprod,
        }
    }

    /// Current tally for one primitive.
    pub fn get(&self, c: Counter) -> usize {
        match c {
            Counter::Obj => self.obj,
            Counter::Grad => self.grad,
            Counter::Cons => self.cons,
            Counter::Jac => self.jac,
            Counter::JacCoord => self.jac_coord,
            Counter::Jprod => self.jprod,
            Counter::Jtprod => self.jtprod,
            Counter::Hess => self.hess,
            Counter::HessCoord => self.hess_coord,
            Counter::Hprod => self.hprod,
        }
    }

    /// Record one evaluation of the named primitive.
    pub fn increment(&mut self, c: Counter) {
        *self.field_mut(c) += 1;
    }

    /// Undo one recorded evaluation. Saturates at zero.
    pub fn decrement(&mut self, c: Counter) {
        let field = self.field_mut(c);
        *field = field.saturating_sub(1);
    }

    /// Zero every tally.
    pub fn reset(&mut self) {
        *self = Counters::default();
    }

    /// Sum of all tallies.
    pub fn total(&self) -> usize {
        Counter::ALL.iter().map(|&c| self.get(c)).sum()
    }
}
