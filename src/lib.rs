//! Abstract modeling interface for nonlinear programming.
//!
//! A common contract — [`NlpModel`] — that any optimization-problem
//! representation implements so that generic algorithms can consume
//! arbitrary concrete models interchangeably: objective, gradient,
//! constraints, and Jacobian/Hessian in structure, coordinate, dense,
//! and operator form, with per-model evaluation [`Counters`].
//!
//! On top of the contract:
//!
//! - [`QuasiNewtonModel`] wraps an existing model, substituting a
//!   maintained limited-memory curvature approximation
//!   ([`LbfgsOperator`] or [`Lsr1Operator`]) for the true Hessian while
//!   forwarding every other primitive unchanged.
//! - The [`dercheck`] module validates reported derivatives against
//!   centered finite-difference estimates.
//! - [`FnModel`] turns plain closures into a model, for quick problem
//!   definitions and tests.
//!
//! This crate is a specification/dispatch layer, not a solver: automatic
//! differentiation, sparse factorizations, and the optimization loop
//! itself belong to its consumers.

pub mod counters;
pub mod dercheck;
pub mod error;
pub mod float;
pub mod fn_model;
pub mod lbfgs;
pub mod lsr1;
pub mod meta;
pub mod model;
pub mod operator;
pub mod quasi_newton;

#[cfg(feature = "nalgebra")]
pub mod nalgebra_support;

pub use counters::{Counter, Counters};
pub use dercheck::{
    gradient_check, hessian_check, hessian_symmetry_check, jacobian_check, CheckOptions,
    EntryDiscrepancy, GradientDiscrepancy,
};
pub use error::{ModelError, Result};
pub use float::Float;
pub use fn_model::FnModel;
pub use lbfgs::{LbfgsConfig, LbfgsOperator};
pub use lsr1::{Lsr1Config, Lsr1Operator};
pub use meta::ModelMeta;
pub use model::NlpModel;
pub use operator::{CooOperator, HessianOp, JacobianOp, LinearOperator};
pub use quasi_newton::{LbfgsModel, Lsr1Model, QuasiNewtonModel, QuasiNewtonOperator};
