//! where `import` gets module bodies from

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::strmap::StrMap;

use super::error::{EvaResult, EvaErrorType};
use super::expr::Expr;

pub trait Loader {
	/// the body of module `name` as a `(begin ...)` form
	fn load(&self, name: &str, map: &mut StrMap) -> EvaResult<Expr>;
}

/// wrap top level forms in a `begin`
pub fn as_body(forms: Vec<Expr>) -> Expr {
	let mut items = Vec::with_capacity(forms.len() + 1);
	items.push(Expr::sym("begin"));
	items.extend(forms);
	Expr::List(items)
}

/// nothing can be imported
pub struct NoLoader;

impl Loader for NoLoader {
	fn load(&self, name: &str, _: &mut StrMap) -> EvaResult<Expr> {
		Err(EvaErrorType::ModuleNotFound(name.to_string()).into())
	}
}

/// module bodies handed over up front
#[derive(Default)]
pub struct MemoryLoader {
	modules: HashMap<String, Expr>,
}

impl MemoryLoader {
	pub fn new() -> Self {
		Self::default()
	}
	/// `forms` are the module's top level forms
	pub fn insert(&mut self, name: &str, forms: Vec<Expr>) {
		self.modules.insert(name.to_string(), as_body(forms));
	}
	pub fn with(mut self, name: &str, forms: Vec<Expr>) -> Self {
		self.insert(name, forms);
		self
	}
}

impl Loader for MemoryLoader {
	fn load(&self, name: &str, _: &mut StrMap) -> EvaResult<Expr> {
		self.modules.get(name).cloned().ok_or_else(|| EvaErrorType::ModuleNotFound(name.to_string()).into())
	}
}

/// reads `<root>/<name>.json`, a json array of top level forms
pub struct FileLoader {
	root: PathBuf,
}

impl FileLoader {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		FileLoader { root: root.into() }
	}
	fn path(&self, name: &str) -> PathBuf {
		self.root.join(format!("{}.json", name))
	}
}

impl Loader for FileLoader {
	fn load(&self, name: &str, map: &mut StrMap) -> EvaResult<Expr> {
		let path = self.path(name);
		log::debug!("loading module {} from {}", name, path.display());
		let load_error = |cause: String| EvaErrorType::LoadError(name.to_string(), cause);
		let text = match fs::read_to_string(&path) {
			Ok(v) => v,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(EvaErrorType::ModuleNotFound(name.to_string()).into()),
			Err(err) => return Err(load_error(format!("{}: {}", path.display(), err)).into()),
		};
		let json: serde_json::Value = serde_json::from_str(&text).map_err(|err| load_error(err.to_string()))?;
		match json {
			serde_json::Value::Array(items) => Ok(as_body(items
				.iter()
				.map(|v| Expr::from_json(v, map))
				.collect::<EvaResult<Vec<_>>>()?)),
			_ => Err(load_error("expected an array of forms".to_string()).into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn memory_loader_wraps_in_begin() {
		let loader = MemoryLoader::new().with("M", vec![Expr::sym("x")]);
		let body = loader.load("M", &mut StrMap::new()).unwrap();
		assert_eq!(body.to_string(), "(begin x)");
		assert!(loader.load("N", &mut StrMap::new()).is_err());
	}

	#[test]
	fn file_loader_reads_json() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("Math.json"), r#"[["var", "MAX_VALUE", 1000]]"#).unwrap();
		let loader = FileLoader::new(dir.path());
		let body = loader.load("Math", &mut StrMap::new()).unwrap();
		assert_eq!(body.to_string(), "(begin (var MAX_VALUE 1000))");
	}

	#[test]
	fn file_loader_errors() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("Bad.json"), "[1, ").unwrap();
		fs::write(dir.path().join("Obj.json"), r#"{"a": 1}"#).unwrap();
		let loader = FileLoader::new(dir.path());
		let mut map = StrMap::new();
		assert_eq!(loader.load("Nope", &mut map).unwrap_err().0, EvaErrorType::ModuleNotFound("Nope".to_string()));
		assert!(matches!(loader.load("Bad", &mut map).unwrap_err().0, EvaErrorType::LoadError(..)));
		assert!(matches!(loader.load("Obj", &mut map).unwrap_err().0, EvaErrorType::LoadError(..)));
	}
}
