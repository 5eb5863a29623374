//! string interning map

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct MappedStr(Rc<str>);

impl MappedStr {
	pub fn get_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for MappedStr {
	fn borrow(&self) -> &str {
		&self.0
	}
}

// not interned, only used for names the desugarer makes up (tags and such)
impl From<&str> for MappedStr {
	fn from(v: &str) -> Self {
		MappedStr(Rc::from(v))
	}
}

impl fmt::Debug for MappedStr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", &*self.0)
	}
}

impl fmt::Display for MappedStr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl PartialEq<str> for MappedStr {
	fn eq(&self, other: &str) -> bool {
		&*self.0 == other
	}
}

impl PartialEq<&str> for MappedStr {
	fn eq(&self, other: &&str) -> bool {
		&*self.0 == *other
	}
}

#[derive(Default)]
pub struct StrMap {
	data: HashMap<String, Weak<str>>,
}

impl fmt::Debug for StrMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tuple = f.debug_tuple("StrMap");
		for k in self.data.keys() {
			tuple.field(k);
		}
		tuple.finish()
	}
}

impl StrMap {
	pub fn new() -> Self {
		Self {
			data: HashMap::new(),
		}
	}
	pub fn add<T: AsRef<str>>(&mut self, v: T) -> MappedStr {
		let v = v.as_ref();
		if let Some(r) = self.data.get(v).and_then(|r| r.upgrade()) {
			return MappedStr(r);
		}
		let res: Rc<str> = Rc::from(v);
		self.data.insert(v.to_string(), Rc::downgrade(&res));
		MappedStr(res)
	}
	pub fn len(&self) -> usize {
		self.data.len()
	}
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
	/// drop every entry nothing holds on to anymore
	pub fn gc(&mut self) {
		let before = self.data.len();
		self.data.retain(|_, v| v.strong_count() > 0);
		log::debug!("StrMap gc() removed {} string(s)", before - self.data.len());
	}
}
