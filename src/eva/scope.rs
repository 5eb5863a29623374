use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::{fmt, mem};
use std::rc::{Rc, Weak};

use crate::strmap::MappedStr;

use super::error::{EvaResult, EvaErrorType};
use super::value::{Closure, Value};

/// what a scope is being used as, only used when printing things
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
	Global,
	Block,
	Activation,
	Class(MappedStr),
	Instance(MappedStr),
	Module(MappedStr),
}

struct ScopeData {
	kind: ScopeKind,
	data: HashMap<MappedStr, Value>,
	parent: Option<EvaScope>,
}

/// a name -> value record with an optional parent
///
/// globals, blocks, calls, classes, instances and modules are all one of these.
/// cloning gives another handle to the same record
#[derive(Clone)]
pub struct EvaScope(Rc<RefCell<ScopeData>>);

impl EvaScope {
	pub fn new(kind: ScopeKind, parent: Option<EvaScope>) -> Self {
		EvaScope(Rc::new(RefCell::new(ScopeData {
			kind,
			data: HashMap::new(),
			parent,
		})))
	}
	pub fn global() -> Self {
		Self::new(ScopeKind::Global, None)
	}
	pub fn child(&self, kind: ScopeKind) -> Self {
		Self::new(kind, Some(self.clone()))
	}

	pub fn kind(&self) -> ScopeKind {
		self.0.borrow().kind.clone()
	}
	pub fn parent(&self) -> Option<EvaScope> {
		self.0.borrow().parent.clone()
	}
	pub fn ptr_eq(&self, other: &EvaScope) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
	pub fn downgrade(&self) -> WeakScope {
		WeakScope(Rc::downgrade(&self.0))
	}
	/// whether this very scope (not a parent) owns `name`
	pub fn owns(&self, name: &str) -> bool {
		self.0.borrow().data.contains_key(name)
	}

	/// bind in this scope, shadowing whatever the parents have
	pub fn define(&self, name: MappedStr, value: Value) -> Value {
		self.0.borrow_mut().data.insert(name, value.clone());
		value
	}

	/// the nearest scope (this one or a parent) that owns `name`
	pub fn resolve(&self, name: &str) -> EvaResult<EvaScope> {
		let mut current = self.clone();
		loop {
			if current.owns(name) {
				return Ok(current);
			}
			let parent = match current.parent() {
				Some(v) => v,
				None => return Err(EvaErrorType::UndefinedVariable(name.to_string()).into()),
			};
			current = parent;
		}
	}

	pub fn lookup(&self, name: &str) -> EvaResult<Value> {
		let scope = self.resolve(name)?;
		let value = scope.0.borrow().data.get(name).cloned();
		value.ok_or_else(|| EvaErrorType::UndefinedVariable(name.to_string()).into())
	}

	/// overwrite an existing binding wherever in the chain it lives
	pub fn assign(&self, name: &str, value: Value) -> EvaResult<Value> {
		let scope = self.resolve(name)?;
		let mut data = scope.0.borrow_mut();
		match data.data.get_mut(name) {
			Some(slot) => *slot = value.clone(),
			None => return Err(EvaErrorType::UndefinedVariable(name.to_string()).into()),
		}
		Ok(value)
	}

	/// names bound directly in this scope, sorted
	pub fn names(&self) -> Vec<MappedStr> {
		let mut names: Vec<_> = self.0.borrow().data.keys().cloned().collect();
		names.sort_by(|a, b| a.get_ref().cmp(b.get_ref()));
		names
	}
}

/// a handle that doesn't keep the scope alive
#[derive(Clone)]
pub struct WeakScope(Weak<RefCell<ScopeData>>);

impl WeakScope {
	pub fn upgrade(&self) -> Option<EvaScope> {
		self.0.upgrade().map(EvaScope)
	}
	pub fn is_alive(&self) -> bool {
		self.0.strong_count() > 0
	}
}

/// every scope made while evaluating, held weakly
///
/// refcounting alone can't free a scope that holds a closure capturing that
/// same scope, [`ScopeSet::collect`] finds those cycles and breaks them
#[derive(Default)]
pub struct ScopeSet {
	scopes: Vec<WeakScope>,
}

impl ScopeSet {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn track(&mut self, scope: &EvaScope) {
		self.scopes.push(scope.downgrade());
	}
	/// tracked scopes that are still alive
	pub fn len(&self) -> usize {
		self.scopes.iter().filter(|v| v.is_alive()).count()
	}
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// empty every tracked scope nothing outside the scopes can reach anymore,
	/// returns how many were emptied
	pub fn collect(&mut self) -> usize {
		// each of these is one extra strong count on its scope
		let mut live: Vec<EvaScope> = vec![];
		let mut index: HashMap<*const RefCell<ScopeData>, usize> = HashMap::new();
		for scope in self.scopes.iter().filter_map(|v| v.upgrade()) {
			if let Entry::Vacant(slot) = index.entry(Rc::as_ptr(&scope.0)) {
				slot.insert(live.len());
				live.push(scope);
			}
		}
		self.scopes = live.iter().map(|v| v.downgrade()).collect();
		let find = |scope: &EvaScope| index.get(&Rc::as_ptr(&scope.0)).copied();

		// count the references the scopes hold on each other
		let mut inner = vec![0usize; live.len()];
		let mut closures: HashMap<*const Closure, (usize, Rc<Closure>)> = HashMap::new();
		for scope in &live {
			let data = scope.0.borrow();
			if let Some(i) = data.parent.as_ref().and_then(find) {
				inner[i] += 1;
			}
			for value in data.data.values() {
				match value {
					Value::Scope(v) => if let Some(i) = find(v) {
						inner[i] += 1;
					},
					Value::Closure(v) => closures.entry(Rc::as_ptr(v)).or_insert_with(|| (0, v.clone())).0 += 1,
					_ => {},
				}
			}
		}
		// a closure only held by scopes passes its scope reference on, the map's clone is the +1
		for (held, closure) in closures.values() {
			if Rc::strong_count(closure) == held + 1 {
				if let Some(i) = find(&closure.scope) {
					inner[i] += 1;
				}
			}
		}

		// whatever has more holders than the scopes account for is held from outside
		let mut marked = vec![false; live.len()];
		let mut stack: Vec<usize> = (0..live.len())
			.filter(|&i| Rc::strong_count(&live[i].0) - 1 > inner[i])
			.collect();
		while let Some(i) = stack.pop() {
			if mem::replace(&mut marked[i], true) {
				continue;
			}
			let data = live[i].0.borrow();
			stack.extend(data.parent.as_ref().and_then(find));
			for value in data.data.values() {
				match value {
					Value::Scope(v) => stack.extend(find(v)),
					Value::Closure(v) => stack.extend(find(&v.scope)),
					_ => {},
				}
			}
		}
		drop(closures);

		// take the records out first, dropping them can free other scopes
		let mut garbage = vec![];
		for (scope, &kept) in live.iter().zip(&marked) {
			if kept {
				continue;
			}
			let mut data = scope.0.borrow_mut();
			garbage.push((mem::take(&mut data.data), data.parent.take()));
		}
		let count = garbage.len();
		drop(garbage);
		log::debug!("ScopeSet collect() emptied {} scope(s)", count);
		count
	}
}

impl fmt::Debug for EvaScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.borrow();
		f.debug_struct("EvaScope")
			.field("kind", &data.kind)
			.field("names", &self.names())
			.field("has_parent", &data.parent.is_some())
			.finish()
	}
}

impl fmt::Display for EvaScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind() {
			ScopeKind::Global => f.write_str("<global>"),
			ScopeKind::Block | ScopeKind::Activation => f.write_str("<scope>"),
			ScopeKind::Class(name) => write!(f, "<class {}>", name),
			ScopeKind::Instance(name) => write!(f, "<instance of {}>", name),
			ScopeKind::Module(name) => write!(f, "<module {}>", name),
		}
	}
}
