// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Variable safety: which variables an expression binds, given the variables
//! that are already bound when it runs.

use crate::ast::*;
use crate::varset::VarSet;

impl Expr {
    /// Variables newly bound by this expression when the variables in `safe`
    /// are already bound. Negated expressions never bind anything.
    pub fn output_vars(&self, safe: &VarSet) -> VarSet {
        let mut acc = safe.clone();

        if !self.negated {
            match (&self.terms, self.operands()) {
                (ExprTerms::Term(t), _) => term_output_vars(t, &mut acc),
                (ExprTerms::Call(_), [lhs, rhs]) if self.is_equality() => {
                    // Refs on either side are evaluated before unification.
                    term_output_vars(lhs, &mut acc);
                    term_output_vars(rhs, &mut acc);
                    unify(lhs, rhs, &mut acc);
                }
                (ExprTerms::Call(_), operands) => {
                    for t in operands {
                        match &t.value {
                            Value::Var(v) => acc.add(v.clone()),
                            _ => term_output_vars(t, &mut acc),
                        }
                    }
                }
            }
        }

        let outputs = acc.diff(safe);
        tracing::trace!(expr = %self, %safe, %outputs, "output vars");
        outputs
    }
}

impl Body {
    /// Variables bound by the body, threading the bindings of each expression
    /// into the ones that follow it.
    pub fn output_vars(&self, safe: &VarSet) -> VarSet {
        let mut acc = safe.clone();
        for expr in self.iter() {
            let outputs = expr.output_vars(&acc);
            acc.extend(&outputs);
        }
        acc.diff(safe)
    }
}

/// Variables bound by evaluating the refs nested inside `term`. A top level
/// var is a lookup, not a binding.
fn term_output_vars(term: &Term, acc: &mut VarSet) {
    match &term.value {
        Value::Ref(r) => {
            for key in r.keys() {
                match &key.value {
                    Value::Var(v) => acc.add(v.clone()),
                    _ => term_output_vars(key, acc),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|t| term_output_vars(t, acc)),
        Value::Object(pairs) => {
            for (k, v) in pairs {
                term_output_vars(k, acc);
                term_output_vars(v, acc);
            }
        }
        Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Var(_) => {}
    }
}

fn is_unsafe_var<'a>(term: &'a Term, acc: &VarSet) -> Option<&'a Var> {
    term.as_var().filter(|v| !acc.contains(v.as_str()))
}

fn is_determined(term: &Term, acc: &VarSet) -> bool {
    term.vars().iter().all(|v| acc.contains(v.as_str()))
}

fn same_keys(a: &[(Term, Term)], b: &[(Term, Term)]) -> bool {
    a.len() == b.len() && a.iter().all(|(ka, _)| b.iter().any(|(kb, _)| ka == kb))
}

// True for terms whose shape is only known at evaluation time.
fn is_opaque(term: &Term) -> bool {
    matches!(term.value, Value::Var(_) | Value::Ref(_))
}

fn unify(a: &Term, b: &Term, acc: &mut VarSet) {
    if let Some(v) = is_unsafe_var(a, acc) {
        if is_determined(b, acc) {
            acc.add(v.clone());
        }
        return;
    }
    if let Some(v) = is_unsafe_var(b, acc) {
        if is_determined(a, acc) {
            acc.add(v.clone());
        }
        return;
    }

    match (&a.value, &b.value) {
        (Value::Array(xs), Value::Array(ys)) if xs.len() == ys.len() => {
            for (x, y) in xs.iter().zip(ys.iter()) {
                unify(x, y, acc);
            }
        }
        (Value::Object(xs), Value::Object(ys)) if same_keys(xs, ys) => {
            for (k, x) in xs {
                if let Some((_, y)) = ys.iter().find(|(kb, _)| kb == k) {
                    unify(x, y, acc);
                }
            }
        }
        (Value::Array(_) | Value::Object(_), _) if is_opaque(b) && is_determined(b, acc) => {
            bind_structure(a, acc)
        }
        (_, Value::Array(_) | Value::Object(_)) if is_opaque(a) && is_determined(a, acc) => {
            bind_structure(b, acc)
        }
        _ => {}
    }
}

/// Binds the vars sitting in element and value positions of a composite that
/// is unified with a known value. Object keys are never bound.
fn bind_structure(term: &Term, acc: &mut VarSet) {
    let bind = |t: &Term, acc: &mut VarSet| match &t.value {
        Value::Var(v) => acc.add(v.clone()),
        Value::Array(_) | Value::Object(_) => bind_structure(t, acc),
        _ => {}
    };

    match &term.value {
        Value::Array(items) => items.iter().for_each(|t| bind(t, acc)),
        Value::Object(pairs) => pairs.iter().for_each(|(_, v)| bind(v, acc)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{COUNT, EQUALITY, LESS_THAN};

    fn safe(names: &[&str]) -> VarSet {
        names.iter().copied().collect()
    }

    fn r(base: &str, keys: Vec<Term>) -> Term {
        Term::reference(Term::var(base), keys)
    }

    #[test]
    fn ref_keys_bind_left_to_right() {
        let t = r(
            "a",
            vec![
                Term::var("i"),
                Term::string("b"),
                Term::var("j"),
                Term::var("i"),
            ],
        );
        let out = Expr::new(t).output_vars(&safe(&["a"]));
        assert_eq!(out, safe(&["i", "j"]));
    }

    #[test]
    fn arrays_recurse_into_refs() {
        let t = Term::array(vec![
            Term::number(1u64),
            Term::number(2u64),
            r("a", vec![Term::var("i")]),
        ]);
        assert_eq!(Expr::new(t).output_vars(&safe(&["a"])), safe(&["i"]));
    }

    #[test]
    fn unification_binds_values_not_keys() {
        let lhs = Term::object(vec![(
            Term::string("a"),
            Term::array(vec![
                Term::object(vec![(Term::var("x"), Term::var("y"))]),
                r("b", vec![Term::var("z")]),
            ]),
        )]);
        let rhs = r("c", vec![Term::var("i")]);
        let out = EQUALITY.expr(lhs, rhs).output_vars(&safe(&["b", "c"]));
        assert_eq!(out, safe(&["y", "z", "i"]));
    }

    #[test]
    fn builtin_operands_bind() {
        let e = COUNT.call([Term::array(vec![]), Term::var("x")]);
        assert_eq!(e.output_vars(&VarSet::new()), safe(&["x"]));

        let e = LESS_THAN.expr(Term::var("x"), Term::var("y"));
        assert_eq!(e.output_vars(&safe(&["x"])), safe(&["y"]));
    }

    #[test]
    fn negation_binds_nothing() {
        let e = EQUALITY.expr(Term::var("x"), Term::number(1u64)).negate();
        assert!(e.output_vars(&VarSet::new()).is_empty());

        let e = Expr::new(r("a", vec![Term::var("i")])).negate();
        assert!(e.output_vars(&safe(&["a"])).is_empty());
    }

    #[test]
    fn equality_between_vars() {
        let e = EQUALITY.expr(Term::var("x"), Term::var("y"));
        assert!(e.output_vars(&VarSet::new()).is_empty());
        assert_eq!(e.output_vars(&safe(&["y"])), safe(&["x"]));
        assert_eq!(e.output_vars(&safe(&["x"])), safe(&["y"]));
        assert!(e.output_vars(&safe(&["x", "y"])).is_empty());
    }

    #[test]
    fn arrays_unify_pairwise() {
        let e = EQUALITY.expr(
            Term::array(vec![Term::var("x"), Term::number(1u64)]),
            Term::array(vec![Term::string("a"), Term::var("y")]),
        );
        assert_eq!(e.output_vars(&VarSet::new()), safe(&["x", "y"]));

        let e = EQUALITY.expr(
            Term::array(vec![Term::var("x")]),
            Term::array(vec![Term::string("a"), Term::var("y")]),
        );
        assert!(e.output_vars(&VarSet::new()).is_empty());
    }

    #[test]
    fn ref_outputs_feed_unification() {
        let e = EQUALITY.expr(r("a", vec![Term::var("i")]), Term::var("x"));
        assert_eq!(e.output_vars(&safe(&["a"])), safe(&["i", "x"]));
    }

    #[test]
    fn top_level_var_is_not_bound() {
        assert!(Expr::new(Term::var("x")).output_vars(&VarSet::new()).is_empty());
    }

    #[test]
    fn body_threads_bindings() {
        let body = Body::new([
            EQUALITY.expr(Term::var("x"), r("a", vec![Term::var("i")])),
            LESS_THAN.expr(Term::var("x"), Term::var("n")),
        ]);
        assert_eq!(body.output_vars(&safe(&["a"])), safe(&["i", "n", "x"]));
    }
}
