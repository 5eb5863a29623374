use std::{fmt, error};

use super::value::EvaType;

/// the form being evaluated when things went wrong, for diagnostics only
pub type EvaTrace = Option<String>;

#[derive(Debug, Clone, PartialEq)]
pub enum EvaErrorType {
	/// lookup, assign or resolve ran out of scopes
	UndefinedVariable(String),
	/// a closure got fewer arguments than it has parameters
	/// (parameters, got)
	ArityError(usize, usize),
	/// a known tag with missing or wrong slots
	/// (tag, what's wrong)
	MalformedExpression(String, String),
	UnsupportedForm(String),
	TypeMismatch(Vec<EvaType>, EvaType),
	NumberOverflow,
	ModuleNotFound(String),
	LoadError(String, String),
	/// raised by a host callable
	Host(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaError(pub EvaErrorType, pub EvaTrace);

impl EvaError {
	pub fn new(kind: EvaErrorType) -> Self {
		EvaError(kind, None)
	}
	pub fn kind(&self) -> &EvaErrorType {
		&self.0
	}
	/// attach a trace unless a deeper one is already there
	pub fn or_trace(self, trace: impl FnOnce() -> String) -> Self {
		match self.1 {
			Some(_) => self,
			None => EvaError(self.0, Some(trace())),
		}
	}
}

impl From<EvaErrorType> for EvaError {
	fn from(kind: EvaErrorType) -> Self {
		EvaError::new(kind)
	}
}

impl fmt::Display for EvaError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&match &self.0 {
			EvaErrorType::UndefinedVariable(name) => format!("`{}` isn't defined", name),
			EvaErrorType::ArityError(params, got) => format!("Argument count mismatch: expected at least {} argument{}, got {}", params, if *params == 1 {""} else {"s"}, got),
			EvaErrorType::MalformedExpression(tag, what) => format!("Malformed `{}`: {}", tag, what),
			EvaErrorType::UnsupportedForm(what) => format!("Unsupported form: {}", what),
			EvaErrorType::TypeMismatch(expected, got) => format!("Type mismatch, expected {}, got {}", expected.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" or "), got),
			EvaErrorType::NumberOverflow => "Integer overflow".to_string(),
			EvaErrorType::ModuleNotFound(name) => format!("Module `{}` not found", name),
			EvaErrorType::LoadError(name, cause) => format!("Couldn't load module `{}`: {}", name, cause),
			EvaErrorType::Host(msg) => msg.clone(),
		})?;
		if let Some(trace) = &self.1 {
			write!(f, "\n  in {}", trace)?;
		}
		Ok(())
	}
}

impl error::Error for EvaError {}
pub type EvaResult<T> = Result<T, EvaError>;

/// shorthand for the error every shape check raises
pub fn malformed<T>(tag: &str, what: impl Into<String>) -> EvaResult<T> {
	Err(EvaErrorType::MalformedExpression(tag.to_string(), what.into()).into())
}
