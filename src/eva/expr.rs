use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::strmap::{MappedStr, StrMap};

use super::error::{EvaResult, malformed};
use super::number::Number;

/// an expression tree, the way front-ends hand it to us
#[derive(Clone, PartialEq)]
pub enum Expr {
	Number(Number),
	/// already stripped of its quotes
	Text(Rc<str>),
	Symbol(MappedStr),
	Nil,
	List(Vec<Expr>),
}

impl Expr {
	pub fn sym(name: &str) -> Self {
		Expr::Symbol(MappedStr::from(name))
	}
	pub fn list(items: Vec<Expr>) -> Self {
		Expr::List(items)
	}
	pub fn as_symbol(&self) -> Option<&MappedStr> {
		match self {
			Expr::Symbol(v) => Some(v),
			_ => None,
		}
	}
	pub fn is_symbol(&self, name: &str) -> bool {
		matches!(self, Expr::Symbol(v) if *v == name)
	}
	/// the leading tag of a compound form
	pub fn tag(&self) -> Option<&str> {
		match self {
			Expr::List(items) => items.first().and_then(|v| v.as_symbol()).map(|v| v.get_ref()),
			_ => None,
		}
	}

	/// read a json tree
	///
	/// - arrays are compound forms
	/// - `"\"hi\""` is the text `hi`, any other string is a symbol
	/// - `null` is the none atom
	pub fn from_json(json: &Json, map: &mut StrMap) -> EvaResult<Expr> {
		Ok(match json {
			Json::Null => Expr::Nil,
			Json::Number(n) => match n.as_i64() {
				Some(v) => Expr::Number(Number::Int(v)),
				None => match n.as_f64() {
					Some(v) => Expr::Number(Number::Float(v)),
					None => return malformed("number", format!("`{}` doesn't fit", n)),
				},
			},
			Json::String(s) => {
				if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
					Expr::Text(Rc::from(&s[1..s.len() - 1]))
				} else if s.is_empty() {
					return malformed("symbol", "empty symbol");
				} else {
					Expr::Symbol(map.add(s))
				}
			},
			Json::Array(items) => Expr::List(items
				.iter()
				.map(|v| Expr::from_json(v, map))
				.collect::<EvaResult<Vec<_>>>()?),
			Json::Bool(v) => return malformed("atom", format!("`{}` isn't an atom, use the `true`/`false` variables", v)),
			Json::Object(_) => return malformed("atom", "objects can't appear in expressions"),
		})
	}
}

impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expr::Number(v) => write!(f, "{}", v),
			Expr::Text(v) => write!(f, "{:?}", v),
			Expr::Symbol(v) => write!(f, "{}", v),
			Expr::Nil => f.write_str("null"),
			Expr::List(v) => write!(f, "({})", v.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")),
		}
	}
}

impl fmt::Debug for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Expr({})", self)
	}
}
