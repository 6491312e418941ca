// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structural equality. Locations and expression indices never participate.
//! Every sequence compares in order except object pairs, which compare as sets.

use crate::ast::*;

use core::cmp;

impl cmp::PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.terms() == other.terms()
    }
}

impl cmp::Eq for Ref {}

fn objects_equal(a: &[(Term, Term)], b: &[(Term, Term)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|(ka, va)| {
            b.iter()
                .find(|(kb, _)| ka == kb)
                .is_some_and(|(_, vb)| va == vb)
        })
}

impl cmp::PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Var(a), Value::Var(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => objects_equal(a, b),
            _ => false,
        }
    }
}

impl cmp::Eq for Value {}

impl cmp::PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl cmp::Eq for Term {}

impl cmp::PartialEq for ExprTerms {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExprTerms::Term(a), ExprTerms::Term(b)) => a == b,
            (ExprTerms::Call(a), ExprTerms::Call(b)) => a == b,
            // A bare term never equals a call, even a one-element one.
            _ => false,
        }
    }
}

impl cmp::Eq for ExprTerms {}

impl cmp::PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.negated == other.negated && self.terms == other.terms
    }
}

impl cmp::Eq for Expr {}

impl cmp::PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl cmp::Eq for Body {}

impl cmp::PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.key == other.key
            && self.value == other.value
            && self.body == other.body
    }
}

impl cmp::Eq for Rule {}

impl cmp::PartialEq for Import {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.alias == other.alias
    }
}

impl cmp::Eq for Import {}

impl cmp::PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl cmp::Eq for Package {}

impl cmp::PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package && self.imports == other.imports && self.rules == other.rules
    }
}

impl cmp::Eq for Module {}
