use super::error::{EvaErrorType, EvaResult};
use super::number::Number;
use super::scope::EvaScope;
use super::value::{NativeFn, Value};

fn print(args: &[Value]) -> EvaResult<Value> {
	println!("{}", args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" "));
	Ok(Value::Null)
}

fn to_text(args: &[Value]) -> EvaResult<Value> {
	match args {
		[v] => Ok(Value::text(&v.to_string())),
		_ => Err(EvaErrorType::Host(format!("`str` takes one argument, got {}", args.len())).into()),
	}
}

fn not(args: &[Value]) -> EvaResult<Value> {
	match args {
		[v] => Ok(Value::Bool(!v.is_truthy())),
		_ => Err(EvaErrorType::Host(format!("`not` takes one argument, got {}", args.len())).into()),
	}
}

/// the global scope every program starts out with
pub fn default_scope() -> EvaScope {
	let scope = EvaScope::global();
	macro_rules! insert {
		($key:expr, $val:expr) => {
			scope.define($key.into(), $val);
		}
	}
	insert!("true",    Value::Bool(true));
	insert!("false",   Value::Bool(false));
	insert!("null",    Value::Null);
	insert!("version", Value::Number(Number::Float(1.0)));
	insert!("print",   Value::Native(NativeFn::new("print", print)));
	insert!("str",     Value::Native(NativeFn::new("str", to_text)));
	insert!("not",     Value::Native(NativeFn::new("not", not)));
	scope
}
