// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Expr, Term};

use std::collections::BTreeMap;

use lazy_static::lazy_static;

/// A built-in operator that may appear as the first term of a call expression.
#[derive(Debug, PartialEq, Eq)]
pub struct Builtin {
    /// Canonical name. Rendering always uses this name.
    pub name: &'static str,
    /// Infix spelling accepted by the parser, if any.
    pub infix: Option<&'static str>,
    /// Number of operands.
    pub args: usize,
}

impl Builtin {
    /// Builds the expression `name(lhs, rhs)`.
    pub fn expr(&self, lhs: Term, rhs: Term) -> Expr {
        Expr::call(vec![Term::var(self.name), lhs, rhs])
    }

    pub fn call(&self, operands: impl IntoIterator<Item = Term>) -> Expr {
        let mut terms = vec![Term::var(self.name)];
        terms.extend(operands);
        Expr::call(terms)
    }
}

/// The unification operator. This is the only operator whose operands are
/// unified with each other by the safety analysis.
pub static EQUALITY: Builtin = Builtin {
    name: "eq",
    infix: Some("="),
    args: 2,
};

pub static NOT_EQUAL: Builtin = Builtin {
    name: "ne",
    infix: Some("!="),
    args: 2,
};

pub static LESS_THAN: Builtin = Builtin {
    name: "lt",
    infix: Some("<"),
    args: 2,
};

pub static LESS_THAN_EQ: Builtin = Builtin {
    name: "lte",
    infix: Some("<="),
    args: 2,
};

pub static GREATER_THAN: Builtin = Builtin {
    name: "gt",
    infix: Some(">"),
    args: 2,
};

pub static GREATER_THAN_EQ: Builtin = Builtin {
    name: "gte",
    infix: Some(">="),
    args: 2,
};

// Aggregates and arithmetic take their output as the last operand.
pub static COUNT: Builtin = Builtin {
    name: "count",
    infix: None,
    args: 2,
};

pub static SUM: Builtin = Builtin {
    name: "sum",
    infix: None,
    args: 2,
};

pub static MAX: Builtin = Builtin {
    name: "max",
    infix: None,
    args: 2,
};

pub static TO_NUMBER: Builtin = Builtin {
    name: "to_number",
    infix: None,
    args: 2,
};

pub static PLUS: Builtin = Builtin {
    name: "plus",
    infix: None,
    args: 3,
};

pub static MINUS: Builtin = Builtin {
    name: "minus",
    infix: None,
    args: 3,
};

pub static MULTIPLY: Builtin = Builtin {
    name: "mul",
    infix: None,
    args: 3,
};

pub static DIVIDE: Builtin = Builtin {
    name: "div",
    infix: None,
    args: 3,
};

static DEFAULT_BUILTINS: [&Builtin; 14] = [
    &EQUALITY,
    &NOT_EQUAL,
    &LESS_THAN,
    &LESS_THAN_EQ,
    &GREATER_THAN,
    &GREATER_THAN_EQ,
    &COUNT,
    &SUM,
    &MAX,
    &TO_NUMBER,
    &PLUS,
    &MINUS,
    &MULTIPLY,
    &DIVIDE,
];

#[rustfmt::skip]
lazy_static! {
    /// Built-ins keyed by canonical name and by infix spelling.
    pub static ref BUILTINS: BTreeMap<&'static str, &'static Builtin> = {
        let mut m: BTreeMap<&'static str, &'static Builtin> = BTreeMap::new();
        for b in DEFAULT_BUILTINS {
            m.insert(b.name, b);
            if let Some(infix) = b.infix {
                m.insert(infix, b);
            }
        }
        m
    };
}

/// Resolves a canonical name or infix alias.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name).copied()
}

/// Resolves an infix operator token such as `=` or `<=`.
pub fn lookup_infix(op: &str) -> Option<&'static Builtin> {
    lookup(op).filter(|b| b.infix == Some(op))
}
