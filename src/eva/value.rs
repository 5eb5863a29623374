use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::strmap::MappedStr;

use super::error::{EvaResult, EvaErrorType};
use super::form::LambdaForm;
use super::number::Number;
use super::scope::EvaScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaType {
	Null, Bool, Number, Text, Fn, Scope,
}
impl fmt::Display for EvaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			EvaType::Null   => "'null",
			EvaType::Bool   => "'bool",
			EvaType::Number => "'number",
			EvaType::Text   => "'text",
			EvaType::Fn     => "'fn",
			EvaType::Scope  => "'scope",
		})
	}
}

/// a lambda together with the scope it was made in
pub struct Closure {
	pub lambda: Rc<LambdaForm>,
	pub scope: EvaScope,
}

impl fmt::Debug for Closure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Closure").field("params", &self.lambda.params).finish()
	}
}

pub type NativeFnPtr = dyn Fn(&[Value]) -> EvaResult<Value>;

/// a callable the host put in the global scope
#[derive(Clone)]
pub struct NativeFn {
	pub name: MappedStr,
	pub func: Rc<NativeFnPtr>,
}

impl NativeFn {
	pub fn new(name: &str, func: impl Fn(&[Value]) -> EvaResult<Value> + 'static) -> Self {
		NativeFn { name: MappedStr::from(name), func: Rc::new(func) }
	}
	pub fn call(&self, args: &[Value]) -> EvaResult<Value> {
		(self.func)(args)
	}
}

#[derive(Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Number(Number),
	Text(Rc<str>),
	Closure(Rc<Closure>),
	Native(NativeFn),
	Scope(EvaScope),
}

impl Value {
	pub fn int(v: i64) -> Self {
		Value::Number(Number::Int(v))
	}
	pub fn float(v: f64) -> Self {
		Value::Number(Number::Float(v))
	}
	pub fn text(v: &str) -> Self {
		Value::Text(Rc::from(v))
	}

	pub fn get_type(&self) -> EvaType {
		match self {
			Value::Null       => EvaType::Null,
			Value::Bool(_)    => EvaType::Bool,
			Value::Number(_)  => EvaType::Number,
			Value::Text(_)    => EvaType::Text,
			Value::Closure(_) => EvaType::Fn,
			Value::Native(_)  => EvaType::Fn,
			Value::Scope(_)   => EvaType::Scope,
		}
	}

	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Bool(v) => *v,
			Value::Number(v) => !v.is_zero(),
			Value::Text(v) => !v.is_empty(),
			Value::Closure(_) | Value::Native(_) | Value::Scope(_) => true,
		}
	}

	pub fn as_number(&self) -> EvaResult<Number> {
		match self {
			Value::Number(v) => Ok(*v),
			other => Err(EvaErrorType::TypeMismatch(vec![EvaType::Number], other.get_type()).into()),
		}
	}

	pub fn as_scope(&self) -> EvaResult<&EvaScope> {
		match self {
			Value::Scope(v) => Ok(v),
			other => Err(EvaErrorType::TypeMismatch(vec![EvaType::Scope], other.get_type()).into()),
		}
	}

	/// ordering for `<` and `>`, numbers with numbers and text with text
	pub fn compare(&self, other: &Value) -> EvaResult<Option<Ordering>> {
		match (self, other) {
			(Value::Number(a), Value::Number(b)) => Ok(a.compare(*b)),
			(Value::Text(a), Value::Text(b)) => Ok(Some(a.cmp(b))),
			(Value::Number(_), b) => Err(EvaErrorType::TypeMismatch(vec![EvaType::Number], b.get_type()).into()),
			(Value::Text(_), b) => Err(EvaErrorType::TypeMismatch(vec![EvaType::Text], b.get_type()).into()),
			(a, _) => Err(EvaErrorType::TypeMismatch(vec![EvaType::Number, EvaType::Text], a.get_type()).into()),
		}
	}
}

/// what `=` means: numbers by value, texts by content, everything callable or scoped by identity
impl PartialEq for Value {
	fn eq(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
			(Value::Native(a), Value::Native(b)) => Rc::ptr_eq(&a.func, &b.func),
			(Value::Scope(a), Value::Scope(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(v) => f.write_str(if *v {"true"} else {"false"}),
			Value::Number(v) => write!(f, "{}", v),
			Value::Text(v) => f.write_str(v),
			Value::Closure(c) => write!(f, "<lambda ({})>", c.lambda.params.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")),
			Value::Native(n) => write!(f, "<proc {}>", n.name),
			Value::Scope(s) => write!(f, "{}", s),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "Null"),
			Value::Bool(a) => f.debug_tuple("Bool").field(a).finish(),
			Value::Number(a) => f.debug_tuple("Number").field(a).finish(),
			Value::Text(a) => f.debug_tuple("Text").field(a).finish(),
			Value::Closure(a) => f.debug_tuple("Closure").field(a).finish(),
			Value::Native(a) => f.debug_tuple("Native").field(&a.name).finish(),
			Value::Scope(a) => f.debug_tuple("Scope").field(a).finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truthiness() {
		assert!(!Value::Null.is_truthy());
		assert!(!Value::int(0).is_truthy());
		assert!(!Value::text("").is_truthy());
		assert!(!Value::Bool(false).is_truthy());
		assert!(Value::int(-1).is_truthy());
		assert!(Value::text("0").is_truthy());
		assert!(Value::Scope(EvaScope::global()).is_truthy());
	}

	#[test]
	fn equality() {
		assert_eq!(Value::int(1), Value::float(1.0));
		assert_ne!(Value::int(1), Value::text("1"));
		let s = EvaScope::global();
		assert_eq!(Value::Scope(s.clone()), Value::Scope(s));
		assert_ne!(Value::Scope(EvaScope::global()), Value::Scope(EvaScope::global()));
	}

	#[test]
	fn comparing_mixed_types_fails() {
		let err = Value::int(1).compare(&Value::text("a")).unwrap_err();
		assert_eq!(err.0, EvaErrorType::TypeMismatch(vec![EvaType::Number], EvaType::Text));
		assert_eq!(Value::text("a").compare(&Value::text("b")).unwrap(), Some(Ordering::Less));
	}

	#[test]
	fn natives_return_values() {
		let f = NativeFn::new("twice", |args| Ok(Value::Number(args[0].as_number()?.mul(Number::Int(2))?)));
		assert_eq!(f.call(&[Value::int(21)]).unwrap(), Value::int(42));
		assert_eq!(Value::Native(f).to_string(), "<proc twice>");
	}
}
