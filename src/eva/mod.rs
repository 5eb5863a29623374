//! eva, a small tree walking interpreter
//!
//! programs come in as already built expression trees (json arrays here),
//! go through the desugarer once, get lowered into core forms and are then
//! evaluated against a long lived global scope

mod builtin;
mod desugar;
mod error;
mod eval;
mod expr;
mod form;
mod loader;
mod number;
mod scope;
mod value;

pub use builtin::default_scope;
pub use desugar::{desugar, rewrite};
pub use error::{EvaError, EvaErrorType, EvaResult};
pub use eval::{apply, EvaEnv};
pub use expr::Expr;
pub use form::{Form, LambdaForm};
pub use loader::{FileLoader, Loader, MemoryLoader, NoLoader};
pub use number::Number;
pub use scope::{EvaScope, ScopeKind, ScopeSet, WeakScope};
pub use value::{Closure, EvaType, NativeFn, Value};

pub struct Eva {
	scope: EvaScope,
	env: EvaEnv,
}

impl Default for Eva {
	fn default() -> Self {
		Self::new()
	}
}

impl Eva {
	/// builtins in the global scope, no imports
	pub fn new() -> Self {
		Self::with_scope(default_scope(), Box::new(NoLoader))
	}
	pub fn with_loader(loader: Box<dyn Loader>) -> Self {
		Self::with_scope(default_scope(), loader)
	}
	/// bring your own global scope
	pub fn with_scope(scope: EvaScope, loader: Box<dyn Loader>) -> Self {
		let mut env = EvaEnv::new(loader);
		env.scopes.track(&scope);
		Eva { scope, env }
	}

	pub fn global(&self) -> &EvaScope {
		&self.scope
	}

	/// turn a json tree into an expression, interning its symbols
	pub fn read(&mut self, json: &serde_json::Value) -> EvaResult<Expr> {
		Expr::from_json(json, &mut self.env.map)
	}

	/// desugar and lower, the form can be evaluated any number of times
	pub fn prepare(&self, expr: &Expr) -> EvaResult<Form> {
		Form::lower(&desugar(expr)?)
	}

	/// evaluate in the global scope
	pub fn eval(&mut self, expr: &Expr) -> EvaResult<Value> {
		let scope = self.scope.clone();
		self.eval_in(expr, &scope)
	}

	pub fn eval_in(&mut self, expr: &Expr, scope: &EvaScope) -> EvaResult<Value> {
		let form = self.prepare(expr)?;
		let res = eval::eval(&form, scope, &mut self.env);
		log::debug!("eval result: {:?}", res);
		res
	}

	/// a whole program: every form straight in the global scope, value of the last one
	pub fn eval_global(&mut self, exprs: &[Expr]) -> EvaResult<Value> {
		let forms = exprs.iter().map(|v| self.prepare(v)).collect::<EvaResult<Vec<_>>>()?;
		let res = eval::eval_block(&forms, &self.scope, &mut self.env);
		log::debug!("program result: {:?}", res);
		res
	}

	/// read and evaluate one json tree
	pub fn eval_json(&mut self, json: &serde_json::Value) -> EvaResult<Value> {
		let expr = self.read(json)?;
		let res = self.eval(&expr);
		self.gc();
		res
	}

	/// read and evaluate a json array of top level forms
	pub fn eval_program_json(&mut self, json: &serde_json::Value) -> EvaResult<Value> {
		let exprs = match json {
			serde_json::Value::Array(items) => items.iter().map(|v| self.read(v)).collect::<EvaResult<Vec<_>>>()?,
			_ => return Err(EvaErrorType::MalformedExpression("program".to_string(), "expected an array of forms".to_string()).into()),
		};
		let res = self.eval_global(&exprs);
		self.gc();
		res
	}

	/// free whatever the last evaluations left behind, the json entry points do this on their own
	pub fn gc(&mut self) {
		self.env.gc();
	}

	/// call a callable value from outside
	pub fn call(&mut self, func: &Value, args: &[Value]) -> EvaResult<Value> {
		apply(func, args, &mut self.env)
	}
}

impl Drop for Eva {
	fn drop(&mut self) {
		// let go of the global scope first, it only outlives us if someone else holds it
		drop(std::mem::replace(&mut self.scope, EvaScope::global()));
		self.env.gc();
	}
}
