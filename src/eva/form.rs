//! core forms
//!
//! a desugared [`Expr`] gets lowered into a [`Form`] once, checking every
//! slot on the way. the evaluator matches on `Form` so a form it doesn't
//! handle is a compile error, not a silent no-op

use std::fmt;
use std::rc::Rc;

use crate::strmap::MappedStr;

use super::desugar::is_sugar;
use super::error::{EvaResult, EvaErrorType, malformed};
use super::expr::Expr;
use super::number::Number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Add, Sub, Mul, Gt, Lt, Eq,
}

impl BinaryOp {
	fn from_tag(tag: &str) -> Option<Self> {
		Some(match tag {
			"+" => BinaryOp::Add,
			"-" => BinaryOp::Sub,
			"*" => BinaryOp::Mul,
			">" => BinaryOp::Gt,
			"<" => BinaryOp::Lt,
			"=" => BinaryOp::Eq,
			_ => return None,
		})
	}
	pub fn tag(self) -> &'static str {
		match self {
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Gt  => ">",
			BinaryOp::Lt  => "<",
			BinaryOp::Eq  => "=",
		}
	}
}

/// parameters and a body, shared between every closure made from it
#[derive(Debug)]
pub struct LambdaForm {
	pub params: Vec<MappedStr>,
	pub body: Form,
}

#[derive(Debug, Clone)]
pub enum Form {
	Nil,
	Number(Number),
	Text(Rc<str>),
	Symbol(MappedStr),
	Binary(BinaryOp, Box<Form>, Box<Form>),
	Negate(Box<Form>),
	Var(MappedStr, Box<Form>),
	Set(MappedStr, Box<Form>),
	/// (set (prop object name) value)
	SetProp(Box<Form>, MappedStr, Box<Form>),
	Begin(Vec<Form>),
	If(Box<Form>, Box<Form>, Box<Form>),
	While(Box<Form>, Box<Form>),
	Lambda(Rc<LambdaForm>),
	Class(MappedStr, Box<Form>, Box<Form>),
	New(MappedStr, Vec<Form>),
	Prop(Box<Form>, MappedStr),
	Super(Box<Form>),
	Module(MappedStr, Box<Form>),
	Import(MappedStr),
	Apply(Box<Form>, Vec<Form>),
}

fn boxed(expr: &Expr) -> EvaResult<Box<Form>> {
	Ok(Box::new(Form::lower(expr)?))
}

fn name_slot(tag: &str, what: &str, expr: &Expr) -> EvaResult<MappedStr> {
	match expr {
		Expr::Symbol(v) => Ok(v.clone()),
		other => malformed(tag, format!("{} has to be a symbol, got `{}`", what, other)),
	}
}

impl Form {
	/// check and convert a desugared expression
	pub fn lower(expr: &Expr) -> EvaResult<Form> {
		let items = match expr {
			Expr::Nil => return Ok(Form::Nil),
			Expr::Number(v) => return Ok(Form::Number(*v)),
			Expr::Text(v) => return Ok(Form::Text(v.clone())),
			Expr::Symbol(v) => return Ok(Form::Symbol(v.clone())),
			Expr::List(items) => items,
		};
		let tag = match items.first() {
			None => return Err(EvaErrorType::UnsupportedForm("empty form `()`".to_string()).into()),
			Some(Expr::Symbol(v)) => v.get_ref(),
			// ((prop p calc) p) and friends
			Some(_) => return Form::lower_apply(items),
		};
		if let Some(op) = BinaryOp::from_tag(tag) {
			return match (op, items.len()) {
				(BinaryOp::Sub, 2) => Ok(Form::Negate(boxed(&items[1])?)),
				(op, 3) => Ok(Form::Binary(op, boxed(&items[1])?, boxed(&items[2])?)),
				(BinaryOp::Sub, _) => malformed(tag, "expected (- a b) or (- a)"),
				(_, _) => malformed(tag, format!("expected ({} a b)", tag)),
			};
		}
		match tag {
			"var" => match items.as_slice() {
				[_, name, value] => Ok(Form::Var(name_slot(tag, "the name", name)?, boxed(value)?)),
				_ => malformed(tag, "expected (var name value)"),
			},
			"set" => match items.as_slice() {
				[_, Expr::Symbol(name), value] => Ok(Form::Set(name.clone(), boxed(value)?)),
				[_, target, value] if target.tag() == Some("prop") => match target {
					Expr::List(prop) if prop.len() == 3 => Ok(Form::SetProp(
						boxed(&prop[1])?,
						name_slot("prop", "the property name", &prop[2])?,
						boxed(value)?,
					)),
					_ => malformed("prop", "expected (prop object name)"),
				},
				[_, target, _] => malformed(tag, format!("can't assign to `{}`", target)),
				_ => malformed(tag, "expected (set target value)"),
			},
			"begin" => Ok(Form::Begin(items[1..].iter().map(Form::lower).collect::<EvaResult<_>>()?)),
			"if" => match items.as_slice() {
				[_, cond, then, otherwise] => Ok(Form::If(boxed(cond)?, boxed(then)?, boxed(otherwise)?)),
				[_, _, _] => malformed(tag, "the else branch is missing"),
				_ => malformed(tag, "expected (if condition then else)"),
			},
			"while" => match items.as_slice() {
				[_, cond, body] => Ok(Form::While(boxed(cond)?, boxed(body)?)),
				_ => malformed(tag, "expected (while condition body)"),
			},
			"lambda" => match items.as_slice() {
				[_, params, body] => Ok(Form::Lambda(Rc::new(LambdaForm {
					params: Form::lower_params(params)?,
					body: Form::lower(body)?,
				}))),
				_ => malformed(tag, "expected (lambda params body)"),
			},
			"class" => match items.as_slice() {
				[_, name, parent, body] => Ok(Form::Class(name_slot(tag, "the name", name)?, boxed(parent)?, boxed(body)?)),
				_ => malformed(tag, "expected (class name parent body)"),
			},
			"new" => match items.as_slice() {
				[_, name, args @ ..] => Ok(Form::New(
					name_slot(tag, "the class", name)?,
					args.iter().map(Form::lower).collect::<EvaResult<_>>()?,
				)),
				_ => malformed(tag, "expected (new class args...)"),
			},
			"prop" => match items.as_slice() {
				[_, target, name] => Ok(Form::Prop(boxed(target)?, name_slot(tag, "the property name", name)?)),
				_ => malformed(tag, "expected (prop object name)"),
			},
			"super" => match items.as_slice() {
				[_, class] => Ok(Form::Super(boxed(class)?)),
				_ => malformed(tag, "expected (super class)"),
			},
			"module" => match items.as_slice() {
				[_, name, body] => Ok(Form::Module(name_slot(tag, "the name", name)?, boxed(body)?)),
				_ => malformed(tag, "expected (module name body)"),
			},
			"import" => match items.as_slice() {
				[_, name] => Ok(Form::Import(name_slot(tag, "the module name", name)?)),
				_ => malformed(tag, "expected (import name)"),
			},
			sugar if is_sugar(sugar) => Err(EvaErrorType::UnsupportedForm(format!("`{}` has to be desugared first", sugar)).into()),
			_ => Form::lower_apply(items),
		}
	}

	fn lower_apply(items: &[Expr]) -> EvaResult<Form> {
		Ok(Form::Apply(
			boxed(&items[0])?,
			items[1..].iter().map(Form::lower).collect::<EvaResult<_>>()?,
		))
	}

	/// `x` or `(x y)`
	fn lower_params(params: &Expr) -> EvaResult<Vec<MappedStr>> {
		match params {
			Expr::Symbol(v) => Ok(vec![v.clone()]),
			Expr::List(list) => list.iter().map(|v| name_slot("lambda", "a parameter", v)).collect(),
			other => malformed("lambda", format!("`{}` isn't a parameter list", other)),
		}
	}
}

impl fmt::Display for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn seq(forms: &[Form]) -> String {
			forms.iter().map(|v| format!(" {}", v)).collect()
		}
		match self {
			Form::Nil => f.write_str("null"),
			Form::Number(v) => write!(f, "{}", v),
			Form::Text(v) => write!(f, "{:?}", v),
			Form::Symbol(v) => write!(f, "{}", v),
			Form::Binary(op, a, b) => write!(f, "({} {} {})", op.tag(), a, b),
			Form::Negate(a) => write!(f, "(- {})", a),
			Form::Var(name, value) => write!(f, "(var {} {})", name, value),
			Form::Set(name, value) => write!(f, "(set {} {})", name, value),
			Form::SetProp(target, name, value) => write!(f, "(set (prop {} {}) {})", target, name, value),
			Form::Begin(forms) => write!(f, "(begin{})", seq(forms)),
			Form::If(c, t, e) => write!(f, "(if {} {} {})", c, t, e),
			Form::While(c, b) => write!(f, "(while {} {})", c, b),
			Form::Lambda(l) => write!(f, "(lambda ({}) {})", l.params.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" "), l.body),
			Form::Class(name, parent, body) => write!(f, "(class {} {} {})", name, parent, body),
			Form::New(name, args) => write!(f, "(new {}{})", name, seq(args)),
			Form::Prop(target, name) => write!(f, "(prop {} {})", target, name),
			Form::Super(class) => write!(f, "(super {})", class),
			Form::Module(name, body) => write!(f, "(module {} {})", name, body),
			Form::Import(name) => write!(f, "(import {})", name),
			Form::Apply(head, args) => write!(f, "({}{})", head, seq(args)),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::strmap::StrMap;

	fn lower(json: serde_json::Value) -> EvaResult<Form> {
		Form::lower(&Expr::from_json(&json, &mut StrMap::new())?)
	}

	fn malformed_tag(res: EvaResult<Form>) -> String {
		match res {
			Err(err) => match err.0 {
				EvaErrorType::MalformedExpression(tag, _) => tag,
				other => panic!("expected a malformed expression, got {:?}", other),
			},
			Ok(form) => panic!("expected an error, got {}", form),
		}
	}

	#[test]
	fn lowers_core_forms() {
		let form = lower(json!(["begin", ["var", "x", 1], ["if", [">", "x", 0], ["-", "x"], 0]])).unwrap();
		assert_eq!(form.to_string(), "(begin (var x 1) (if (> x 0) (- x) 0))");
		assert!(matches!(lower(json!(["set", ["prop", "self", "x"], 1])).unwrap(), Form::SetProp(..)));
	}

	#[test]
	fn lambda_params_are_normalized() {
		match lower(json!(["lambda", "x", ["*", "x", "x"]])).unwrap() {
			Form::Lambda(l) => assert_eq!(l.params, vec![MappedStr::from("x")]),
			other => panic!("not a lambda: {}", other),
		}
		assert_eq!(malformed_tag(lower(json!(["lambda", ["x", 1], "x"]))), "lambda");
	}

	#[test]
	fn missing_slots_are_malformed() {
		assert_eq!(malformed_tag(lower(json!(["if", 1, 2]))), "if");
		assert_eq!(malformed_tag(lower(json!(["var", 1, 2]))), "var");
		assert_eq!(malformed_tag(lower(json!(["while", 1]))), "while");
		assert_eq!(malformed_tag(lower(json!(["*", 1]))), "*");
		assert_eq!(malformed_tag(lower(json!(["set", 1, 2]))), "set");
		assert_eq!(malformed_tag(lower(json!(["class", "A", "null"]))), "class");
		assert_eq!(malformed_tag(lower(json!(["import"]))), "import");
	}

	#[test]
	fn unknown_tags_are_applications() {
		assert!(matches!(lower(json!(["square", 2])).unwrap(), Form::Apply(..)));
		assert!(matches!(lower(json!([["prop", "p", "calc"], "p"])).unwrap(), Form::Apply(..)));
	}

	#[test]
	fn empty_and_raw_sugar_are_unsupported() {
		assert!(matches!(lower(json!([])).unwrap_err().0, EvaErrorType::UnsupportedForm(_)));
		assert!(matches!(lower(json!(["++", "x"])).unwrap_err().0, EvaErrorType::UnsupportedForm(_)));
	}
}
