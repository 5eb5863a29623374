//! eva :)
//!
//! evaluates programs written as nested tagged lists: arithmetic, variables,
//! blocks, loops, closures, classes with single inheritance and modules

pub mod config;
pub mod eva;
pub mod strmap;

pub use crate::eva::{Eva, EvaError, EvaErrorType, EvaResult, EvaScope, Expr, Value};
