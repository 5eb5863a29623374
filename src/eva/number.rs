//! numbers
//!
//! either an i64 or an f64. mixing the two makes both sides floats,
//! integer math is checked so overflow is an error instead of a wrap

use std::cmp::Ordering;
use std::fmt;

use super::error::{EvaResult, EvaErrorType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	Int(i64),
	Float(f64),
}

/// both operands brought to the same representation
enum Uniform {
	Int(i64, i64),
	Float(f64, f64),
}

impl Number {
	pub fn as_f64(self) -> f64 {
		match self {
			Number::Int(v) => v as f64,
			Number::Float(v) => v,
		}
	}
	pub fn is_zero(self) -> bool {
		match self {
			Number::Int(v) => v == 0,
			Number::Float(v) => v == 0.0,
		}
	}
	fn uniform(self, other: Number) -> Uniform {
		match (self, other) {
			(Number::Int(a), Number::Int(b)) => Uniform::Int(a, b),
			(a, b) => Uniform::Float(a.as_f64(), b.as_f64()),
		}
	}
}

macro_rules! checked_op {
	($name:ident, $checked:ident, $op:tt) => {
		pub fn $name(self, other: Number) -> EvaResult<Number> {
			match self.uniform(other) {
				Uniform::Int(a, b) => a.$checked(b).map(Number::Int).ok_or_else(|| EvaErrorType::NumberOverflow.into()),
				Uniform::Float(a, b) => Ok(Number::Float(a $op b)),
			}
		}
	};
}

impl Number {
	checked_op!(add, checked_add, +);
	checked_op!(sub, checked_sub, -);
	checked_op!(mul, checked_mul, *);

	pub fn neg(self) -> EvaResult<Number> {
		match self {
			Number::Int(v) => v.checked_neg().map(Number::Int).ok_or_else(|| EvaErrorType::NumberOverflow.into()),
			Number::Float(v) => Ok(Number::Float(-v)),
		}
	}

	/// `None` only when a NaN is involved
	pub fn compare(self, other: Number) -> Option<Ordering> {
		match self.uniform(other) {
			Uniform::Int(a, b) => Some(a.cmp(&b)),
			Uniform::Float(a, b) => a.partial_cmp(&b),
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Number::Int(v) => write!(f, "{}", v),
			// keep floats looking like floats
			Number::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
			Number::Float(v) => write!(f, "{}", v),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ints_stay_ints() {
		assert_eq!(Number::Int(2).add(Number::Int(3)).unwrap(), Number::Int(5));
		assert_eq!(Number::Int(2).mul(Number::Int(-3)).unwrap(), Number::Int(-6));
	}

	#[test]
	fn mixing_promotes() {
		assert_eq!(Number::Int(2).add(Number::Float(0.5)).unwrap(), Number::Float(2.5));
		assert_eq!(Number::Float(1.0).compare(Number::Int(1)), Some(Ordering::Equal));
	}

	#[test]
	fn overflow_is_an_error() {
		let err = Number::Int(i64::MAX).add(Number::Int(1)).unwrap_err();
		assert_eq!(err.0, EvaErrorType::NumberOverflow);
		assert!(Number::Int(i64::MIN).neg().is_err());
	}

	#[test]
	fn display() {
		assert_eq!(Number::Int(160).to_string(), "160");
		assert_eq!(Number::Float(1.0).to_string(), "1.0");
		assert_eq!(Number::Float(2.25).to_string(), "2.25");
	}
}
