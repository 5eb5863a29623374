use std::cmp::Ordering;
use std::rc::Rc;

use crate::strmap::{MappedStr, StrMap};

use super::desugar::desugar;
use super::error::{EvaResult, EvaErrorType};
use super::form::{BinaryOp, Form};
use super::loader::Loader;
use super::scope::{EvaScope, ScopeKind, ScopeSet};
use super::value::{Closure, EvaType, Value};

/// everything evaluation needs besides the scope
pub struct EvaEnv {
	pub map: StrMap,
	pub scopes: ScopeSet,
	pub loader: Box<dyn Loader>,
}

impl EvaEnv {
	pub fn new(loader: Box<dyn Loader>) -> Self {
		EvaEnv { map: StrMap::new(), scopes: ScopeSet::new(), loader }
	}

	/// a new scope under `parent`, tracked so cycles through it can be collected
	pub fn scope(&mut self, kind: ScopeKind, parent: &EvaScope) -> EvaScope {
		let scope = EvaScope::new(kind, Some(parent.clone()));
		self.scopes.track(&scope);
		scope
	}

	/// drop unused names and break the scope cycles nothing can reach
	pub fn gc(&mut self) {
		self.scopes.collect();
		self.map.gc();
	}
}

pub fn eval(form: &Form, scope: &EvaScope, env: &mut EvaEnv) -> EvaResult<Value> {
	log::trace!("eval {}", form);
	eval_form(form, scope, env).map_err(|err| match form {
		// the enclosing form makes for a more useful trace than a lone atom
		Form::Nil | Form::Number(_) | Form::Text(_) | Form::Symbol(_) => err,
		_ => err.or_trace(|| form.to_string()),
	})
}

fn eval_form(form: &Form, scope: &EvaScope, env: &mut EvaEnv) -> EvaResult<Value> {
	match form {
		Form::Nil => Ok(Value::Null),
		Form::Number(v) => Ok(Value::Number(*v)),
		Form::Text(v) => Ok(Value::Text(v.clone())),
		Form::Symbol(name) => scope.lookup(name.get_ref()),
		Form::Binary(op, a, b) => {
			let a = eval(a, scope, env)?;
			let b = eval(b, scope, env)?;
			binary(*op, &a, &b)
		},
		Form::Negate(a) => Ok(Value::Number(eval(a, scope, env)?.as_number()?.neg()?)),
		// always local, that's what makes shadowing work
		Form::Var(name, value) => {
			let value = eval(value, scope, env)?;
			Ok(scope.define(name.clone(), value))
		},
		Form::Set(name, value) => {
			let value = eval(value, scope, env)?;
			scope.assign(name.get_ref(), value)
		},
		// property writes land on the object itself, never further up
		Form::SetProp(target, name, value) => {
			let object = eval(target, scope, env)?.as_scope()?.clone();
			let value = eval(value, scope, env)?;
			Ok(object.define(name.clone(), value))
		},
		Form::Begin(forms) => {
			let block = env.scope(ScopeKind::Block, scope);
			eval_block(forms, &block, env)
		},
		Form::If(cond, then, otherwise) => {
			if eval(cond, scope, env)?.is_truthy() {
				eval(then, scope, env)
			} else {
				eval(otherwise, scope, env)
			}
		},
		Form::While(cond, body) => {
			let mut ret = Value::Null;
			while eval(cond, scope, env)?.is_truthy() {
				ret = eval(body, scope, env)?;
			}
			Ok(ret)
		},
		Form::Lambda(lambda) => Ok(Value::Closure(Rc::new(Closure {
			lambda: lambda.clone(),
			scope: scope.clone(),
		}))),
		Form::Class(name, parent, body) => {
			// any falsy parent means the enclosing scope
			let parent = match eval(parent, scope, env)? {
				Value::Scope(v) => v,
				v if !v.is_truthy() => scope.clone(),
				other => return Err(EvaErrorType::TypeMismatch(vec![EvaType::Scope, EvaType::Null], other.get_type()).into()),
			};
			let class = env.scope(ScopeKind::Class(name.clone()), &parent);
			eval_body(body, &class, env)?;
			log::debug!("class {} defined with {:?}", name, class.names());
			Ok(scope.define(name.clone(), Value::Scope(class)))
		},
		Form::New(name, args) => {
			let class = scope.lookup(name.get_ref())?.as_scope()?.clone();
			let instance = env.scope(ScopeKind::Instance(name.clone()), &class);
			// the instance goes in as the first argument, that's all `self` is
			let mut values = Vec::with_capacity(args.len() + 1);
			values.push(Value::Scope(instance.clone()));
			for arg in args {
				values.push(eval(arg, scope, env)?);
			}
			let constructor = class.lookup("constructor")?;
			apply(&constructor, &values, env)?;
			Ok(Value::Scope(instance))
		},
		Form::Prop(target, name) => eval(target, scope, env)?.as_scope()?.lookup(name.get_ref()),
		// straight to the parent, no lookup involved
		Form::Super(class) => Ok(match eval(class, scope, env)?.as_scope()?.parent() {
			Some(parent) => Value::Scope(parent),
			None => Value::Null,
		}),
		Form::Module(name, body) => eval_module(name, body, scope, env),
		Form::Import(name) => {
			log::debug!("importing {}", name);
			let body = env.loader.load(name.get_ref(), &mut env.map)?;
			let body = Form::lower(&desugar(&body)?)?;
			eval_module(name, &body, scope, env)
		},
		Form::Apply(head, args) => {
			let func = eval(head, scope, env)?;
			let args = args.iter().map(|v| eval(v, scope, env)).collect::<EvaResult<Vec<_>>>()?;
			apply(&func, &args, env)
		},
	}
}

/// call something callable with already evaluated arguments
pub fn apply(func: &Value, args: &[Value], env: &mut EvaEnv) -> EvaResult<Value> {
	match func {
		Value::Native(native) => native.call(args),
		Value::Closure(closure) => {
			let params = &closure.lambda.params;
			if args.len() < params.len() {
				return Err(EvaErrorType::ArityError(params.len(), args.len()).into());
			}
			let activation = env.scope(ScopeKind::Activation, &closure.scope);
			// extra arguments are dropped
			for (name, value) in params.iter().zip(args) {
				activation.define(name.clone(), value.clone());
			}
			eval_body(&closure.lambda.body, &activation, env)
		},
		other => Err(EvaErrorType::UnsupportedForm(format!("can't call {} `{}`", other.get_type(), other)).into()),
	}
}

/// forms in order, value of the last one
pub fn eval_block(forms: &[Form], scope: &EvaScope, env: &mut EvaEnv) -> EvaResult<Value> {
	let mut ret = Value::Null;
	for form in forms {
		ret = eval(form, scope, env)?;
	}
	Ok(ret)
}

/// a `begin` body runs straight in `scope` instead of getting its own child
fn eval_body(body: &Form, scope: &EvaScope, env: &mut EvaEnv) -> EvaResult<Value> {
	match body {
		Form::Begin(forms) => eval_block(forms, scope, env),
		other => eval(other, scope, env),
	}
}

fn eval_module(name: &MappedStr, body: &Form, scope: &EvaScope, env: &mut EvaEnv) -> EvaResult<Value> {
	let module = env.scope(ScopeKind::Module(name.clone()), scope);
	eval_body(body, &module, env)?;
	log::debug!("module {} defined with {:?}", name, module.names());
	Ok(scope.define(name.clone(), Value::Scope(module)))
}

fn binary(op: BinaryOp, a: &Value, b: &Value) -> EvaResult<Value> {
	Ok(match op {
		BinaryOp::Add => match (a, b) {
			(Value::Number(a), Value::Number(b)) => Value::Number(a.add(*b)?),
			(Value::Text(a), Value::Text(b)) => Value::Text(Rc::from(format!("{}{}", a, b))),
			(Value::Number(_), other) => return Err(EvaErrorType::TypeMismatch(vec![EvaType::Number], other.get_type()).into()),
			(Value::Text(_), other) => return Err(EvaErrorType::TypeMismatch(vec![EvaType::Text], other.get_type()).into()),
			(other, _) => return Err(EvaErrorType::TypeMismatch(vec![EvaType::Number, EvaType::Text], other.get_type()).into()),
		},
		BinaryOp::Sub => Value::Number(a.as_number()?.sub(b.as_number()?)?),
		BinaryOp::Mul => Value::Number(a.as_number()?.mul(b.as_number()?)?),
		BinaryOp::Gt => Value::Bool(a.compare(b)? == Some(Ordering::Greater)),
		BinaryOp::Lt => Value::Bool(a.compare(b)? == Some(Ordering::Less)),
		BinaryOp::Eq => Value::Bool(a == b),
	})
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::eva::expr::Expr;
	use crate::eva::loader::NoLoader;

	fn run(json: serde_json::Value) -> EvaResult<Value> {
		let mut env = EvaEnv::new(Box::new(NoLoader));
		let expr = Expr::from_json(&json, &mut env.map)?;
		let form = Form::lower(&desugar(&expr)?)?;
		eval(&form, &EvaScope::global(), &mut env)
	}

	#[test]
	fn arithmetic() {
		assert_eq!(run(json!(["+", ["*", 2, 3], 2])).unwrap(), Value::int(8));
		assert_eq!(run(json!(["-", 5])).unwrap(), Value::int(-5));
		assert_eq!(run(json!(["-", 5, 7])).unwrap(), Value::int(-2));
		assert_eq!(run(json!(["+", "\"ab\"", "\"cd\""])).unwrap(), Value::text("abcd"));
		assert_eq!(run(json!(["=", 2, 2.0])).unwrap(), Value::Bool(true));
		assert_eq!(run(json!(["<", "\"a\"", "\"b\""])).unwrap(), Value::Bool(true));
	}

	#[test]
	fn type_errors_carry_the_form() {
		let err = run(json!(["begin", ["*", 2, "\"x\""]])).unwrap_err();
		assert_eq!(err.0, EvaErrorType::TypeMismatch(vec![EvaType::Number], EvaType::Text));
		assert_eq!(err.1.as_deref(), Some("(* 2 \"x\")"));
	}

	#[test]
	fn while_without_iterations_is_null() {
		assert_eq!(run(json!(["while", 0, 1])).unwrap(), Value::Null);
	}

	#[test]
	fn while_is_its_last_body_value() {
		let program = json!(["begin",
			["var", "i", 0],
			["while", ["<", "i", 3], ["begin", ["set", "i", ["+", "i", 1]], ["*", "i", 10]]],
		]);
		assert_eq!(run(program).unwrap(), Value::int(30));
	}

	#[test]
	fn scopes_need_scope_values() {
		let mismatch = |json| match run(json).unwrap_err().0 {
			EvaErrorType::TypeMismatch(_, got) => got,
			other => panic!("expected a type mismatch, got {:?}", other),
		};
		assert_eq!(mismatch(json!(["class", "A", 5, ["begin"]])), EvaType::Number);
		assert_eq!(mismatch(json!(["class", "A", "\"base\"", ["begin"]])), EvaType::Text);
		assert_eq!(mismatch(json!(["prop", 5, "x"])), EvaType::Number);
		assert_eq!(mismatch(json!(["begin", ["var", "A", 1], ["new", "A"]])), EvaType::Number);
		assert_eq!(mismatch(json!(["super", 5])), EvaType::Number);
	}

	#[test]
	fn falsy_class_parent_is_the_enclosing_scope() {
		for parent in [json!(null), json!(0), json!("\"\""), json!("false")] {
			let program = json!(["begin",
				["var", "false", ["=", 1, 2]],
				["var", "outer", 7],
				["class", "A", parent, ["begin", ["def", "get", "self", "outer"]]],
				[["prop", "A", "get"], "A"],
			]);
			assert_eq!(run(program).unwrap(), Value::int(7));
		}
	}

	#[test]
	fn super_of_a_root_is_null() {
		let mut env = EvaEnv::new(Box::new(NoLoader));
		let global = EvaScope::global();
		global.define("root".into(), Value::Scope(EvaScope::global()));
		let expr = Expr::from_json(&json!(["super", "root"]), &mut env.map).unwrap();
		let form = Form::lower(&desugar(&expr).unwrap()).unwrap();
		assert_eq!(eval(&form, &global, &mut env).unwrap(), Value::Null);
	}

	#[test]
	fn begin_scopes_but_if_does_not() {
		assert_eq!(run(json!(["begin", ["var", "x", 1], ["if", 1, ["var", "x", 2], 0], "x"])).unwrap(), Value::int(2));
		assert!(run(json!(["begin", ["begin", ["var", "y", 1]], "y"])).is_err());
	}

	#[test]
	fn arity() {
		let err = run(json!([["lambda", ["a", "b"], "a"], 1])).unwrap_err();
		assert_eq!(err.0, EvaErrorType::ArityError(2, 1));
		assert_eq!(run(json!([["lambda", "a", "a"], 1, 2])).unwrap(), Value::int(1));
	}

	#[test]
	fn calling_a_number_is_unsupported() {
		assert!(matches!(run(json!([1, 2])).unwrap_err().0, EvaErrorType::UnsupportedForm(_)));
	}

	#[test]
	fn import_without_loader() {
		assert_eq!(run(json!(["import", "Math"])).unwrap_err().0, EvaErrorType::ModuleNotFound("Math".to_string()));
	}
}
