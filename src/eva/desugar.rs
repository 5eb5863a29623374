//! syntactic sugar
//!
//! every rewrite here is expr in, expr out, nothing gets evaluated.
//! [`desugar`] walks a whole tree once so the evaluator only ever sees core forms

use super::error::{EvaResult, malformed};
use super::expr::Expr;
use super::number::Number;

pub const SUGAR_TAGS: [&str; 7] = ["++", "--", "+=", "-=", "def", "switch", "for"];

pub fn is_sugar(tag: &str) -> bool {
	SUGAR_TAGS.contains(&tag)
}

fn sym(name: &str) -> Expr {
	Expr::sym(name)
}

/// rewrite every sugar form in the tree, nested ones included
pub fn desugar(expr: &Expr) -> EvaResult<Expr> {
	let items = match expr {
		Expr::List(items) => items,
		other => return Ok(other.clone()),
	};
	if let Some(rewritten) = rewrite(expr)? {
		log::trace!("desugar {} => {}", expr, rewritten);
		return desugar(&rewritten);
	}
	match expr.tag() {
		// parameter lists aren't expressions, leave them alone
		Some("lambda") if items.len() == 3 => Ok(Expr::List(vec![
			items[0].clone(),
			items[1].clone(),
			desugar(&items[2])?,
		])),
		_ => Ok(Expr::List(items.iter().map(desugar).collect::<EvaResult<_>>()?)),
	}
}

/// a single rewrite step, `None` when the form isn't sugar
pub fn rewrite(expr: &Expr) -> EvaResult<Option<Expr>> {
	let items = match expr {
		Expr::List(items) => items,
		_ => return Ok(None),
	};
	Ok(Some(match expr.tag() {
		Some("++") => step_to_set(items, "++", "+")?,
		Some("--") => step_to_set(items, "--", "-")?,
		Some("+=") => update_to_set(items, "+=", "+")?,
		Some("-=") => update_to_set(items, "-=", "-")?,
		Some("def") => def_to_var_lambda(items)?,
		Some("switch") => switch_to_if(items)?,
		Some("for") => for_to_while(items)?,
		_ => return Ok(None),
	}))
}

/// (++ x) -> (set x (+ x 1))
fn step_to_set(items: &[Expr], tag: &str, op: &str) -> EvaResult<Expr> {
	match items {
		[_, target] => Ok(Expr::list(vec![
			sym("set"),
			target.clone(),
			Expr::list(vec![sym(op), target.clone(), Expr::Number(Number::Int(1))]),
		])),
		_ => malformed(tag, format!("expected ({} target)", tag)),
	}
}

/// (+= x e) -> (set x (+ x e))
fn update_to_set(items: &[Expr], tag: &str, op: &str) -> EvaResult<Expr> {
	match items {
		[_, target, value] => Ok(Expr::list(vec![
			sym("set"),
			target.clone(),
			Expr::list(vec![sym(op), target.clone(), value.clone()]),
		])),
		_ => malformed(tag, format!("expected ({} target value)", tag)),
	}
}

/// (def name params body) -> (var name (lambda params body))
fn def_to_var_lambda(items: &[Expr]) -> EvaResult<Expr> {
	match items {
		[_, name @ Expr::Symbol(_), params, body] => Ok(Expr::list(vec![
			sym("var"),
			name.clone(),
			Expr::list(vec![sym("lambda"), normalize_params(params), body.clone()]),
		])),
		[_, _, _, _] => malformed("def", "the name has to be a symbol"),
		_ => malformed("def", "expected (def name params body)"),
	}
}

/// a lone parameter becomes a one element list
pub fn normalize_params(params: &Expr) -> Expr {
	match params {
		Expr::List(_) => params.clone(),
		other => Expr::list(vec![other.clone()]),
	}
}

/// (switch (c1 b1) (c2 b2) (else b3)) -> (if c1 b1 (if c2 b2 b3))
fn switch_to_if(items: &[Expr]) -> EvaResult<Expr> {
	let clauses = items[1..]
		.iter()
		.map(|clause| match clause {
			Expr::List(pair) if pair.len() == 2 => Ok((&pair[0], &pair[1])),
			other => malformed("switch", format!("`{}` isn't a (condition block) pair", other)),
		})
		.collect::<EvaResult<Vec<_>>>()?;
	let ((last_cond, last_block), rest) = match clauses.split_last() {
		Some(v) => v,
		None => return malformed("switch", "no clauses"),
	};
	if !last_cond.is_symbol("else") {
		return malformed("switch", "the last clause has to be (else block)");
	}
	if rest.iter().any(|(cond, _)| cond.is_symbol("else")) {
		return malformed("switch", "`else` can only be the last clause");
	}
	// build inside out so the first clause ends up outermost
	let mut out = (*last_block).clone();
	for (cond, block) in rest.iter().rev() {
		out = Expr::list(vec![sym("if"), (*cond).clone(), (*block).clone(), out]);
	}
	Ok(out)
}

/// (for init cond update body) -> (begin init (while cond (begin body update)))
fn for_to_while(items: &[Expr]) -> EvaResult<Expr> {
	match items {
		[_, init, cond, update, body] => Ok(Expr::list(vec![
			sym("begin"),
			init.clone(),
			Expr::list(vec![
				sym("while"),
				cond.clone(),
				Expr::list(vec![sym("begin"), body.clone(), update.clone()]),
			]),
		])),
		_ => malformed("for", "expected (for init condition update body)"),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::eva::error::EvaErrorType;
	use crate::strmap::StrMap;

	fn read(json: serde_json::Value) -> Expr {
		Expr::from_json(&json, &mut StrMap::new()).unwrap()
	}

	fn desugared(json: serde_json::Value) -> String {
		desugar(&read(json)).unwrap().to_string()
	}

	#[test]
	fn steps_and_updates() {
		assert_eq!(desugared(json!(["++", "x"])), "(set x (+ x 1))");
		assert_eq!(desugared(json!(["--", "x"])), "(set x (- x 1))");
		assert_eq!(desugared(json!(["+=", "sum", "i"])), "(set sum (+ sum i))");
		assert_eq!(desugared(json!(["-=", "x", ["*", 2, 3]])), "(set x (- x (* 2 3)))");
		assert_eq!(desugared(json!(["++", ["prop", "self", "n"]])), "(set (prop self n) (+ (prop self n) 1))");
	}

	#[test]
	fn def_becomes_var_lambda() {
		assert_eq!(desugared(json!(["def", "square", "x", ["*", "x", "x"]])), "(var square (lambda (x) (* x x)))");
		assert_eq!(desugared(json!(["def", "add", ["a", "b"], ["+", "a", "b"]])), "(var add (lambda (a b) (+ a b)))");
	}

	#[test]
	fn switch_nests_in_order() {
		assert_eq!(
			desugared(json!(["switch", [["=", "x", 1], 100], [[">", "x", 1], 200], ["else", 0]])),
			"(if (= x 1) 100 (if (> x 1) 200 0))",
		);
		assert_eq!(desugared(json!(["switch", ["else", 7]])), "7");
	}

	#[test]
	fn switch_needs_trailing_else() {
		let err = desugar(&read(json!(["switch", [["=", "x", 1], 100]]))).unwrap_err();
		assert!(matches!(err.0, EvaErrorType::MalformedExpression(ref tag, _) if tag == "switch"));
		assert!(desugar(&read(json!(["switch", ["else", 1], ["else", 2]]))).is_err());
		assert!(desugar(&read(json!(["switch"]))).is_err());
	}

	#[test]
	fn for_wraps_in_one_block() {
		assert_eq!(
			desugared(json!(["for", ["var", "i", 0], ["<", "i", 10], ["++", "i"], ["+=", "sum", "i"]])),
			"(begin (var i 0) (while (< i 10) (begin (set sum (+ sum i)) (set i (+ i 1)))))",
		);
	}

	#[test]
	fn nested_sugar_is_rewritten() {
		assert_eq!(
			desugared(json!(["lambda", "x", ["begin", ["++", "x"], "x"]])),
			"(lambda x (begin (set x (+ x 1)) x))",
		);
		assert_eq!(desugared(json!(["if", "c", ["def", "f", "a", "a"], 0])), "(if c (var f (lambda (a) a)) 0)");
	}

	#[test]
	fn core_forms_are_untouched() {
		assert_eq!(rewrite(&read(json!(["+", 1, 2]))).unwrap(), None);
		assert_eq!(desugared(json!(["+", 1, 2])), "(+ 1 2)");
	}
}
