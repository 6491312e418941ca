// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::{self, Builtin};
use crate::lexer::Span;
use crate::number::Number;
use crate::varset::VarSet;
use crate::*;

use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

/// Name of the root document that package paths and most import paths hang off.
pub const ROOT_DOCUMENT: &str = "data";

/// A logic variable, identified by its name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(Rc<str>);

impl Var {
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for Var {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A reference: a base term followed by the keys used to index into it.
#[derive(Debug, Clone)]
pub struct Ref(Vec<Term>);

impl Ref {
    pub fn new(terms: Vec<Term>) -> Self {
        Self(terms)
    }

    pub fn base(&self) -> Option<&Term> {
        self.0.first()
    }

    /// The index/key terms following the base.
    pub fn keys(&self) -> &[Term] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }
}

impl Deref for Ref {
    type Target = [Term];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    String(Rc<str>),
    Var(Var),
    Ref(Ref),
    Array(Vec<Term>),
    // Pairs are kept in insertion order; equality ignores the order.
    Object(Vec<(Term, Term)>),
}

impl Value {
    /// Wire tag of the variant.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Var(_) => "var",
            Value::Ref(_) => "ref",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// A value together with where it came from.
#[derive(Debug, Clone)]
pub struct Term {
    pub value: Value,
    pub location: Option<Span>,
}

impl Term {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            location: None,
        }
    }

    pub fn with_location(value: Value, location: Span) -> Self {
        Self {
            value,
            location: Some(location),
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(Value::Boolean(b))
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Self::new(Value::Number(n.into()))
    }

    pub fn string(s: &str) -> Self {
        Self::new(Value::String(s.into()))
    }

    pub fn var(name: &str) -> Self {
        Self::new(Value::Var(Var::new(name)))
    }

    /// Builds `base[k1][k2]...`.
    pub fn reference(base: Term, keys: impl IntoIterator<Item = Term>) -> Self {
        let mut terms = vec![base];
        terms.extend(keys);
        Self::new(Value::Ref(Ref(terms)))
    }

    pub fn ref_of(terms: Vec<Term>) -> Self {
        Self::new(Value::Ref(Ref(terms)))
    }

    pub fn array(items: Vec<Term>) -> Self {
        Self::new(Value::Array(items))
    }

    pub fn object(pairs: Vec<(Term, Term)>) -> Self {
        Self::new(Value::Object(pairs))
    }

    pub fn as_var(&self) -> Option<&Var> {
        match &self.value {
            Value::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Ref> {
        match &self.value {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True if the term contains no variables.
    pub fn is_ground(&self) -> bool {
        match &self.value {
            Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => true,
            Value::Var(_) => false,
            Value::Ref(r) => r.iter().all(Term::is_ground),
            Value::Array(items) => items.iter().all(Term::is_ground),
            Value::Object(pairs) => pairs.iter().all(|(k, v)| k.is_ground() && v.is_ground()),
        }
    }

    pub fn vars(&self) -> VarSet {
        let mut vars = VarSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    pub(crate) fn collect_vars(&self, vars: &mut VarSet) {
        match &self.value {
            Value::Var(v) => vars.add(v.clone()),
            Value::Ref(r) => r.iter().for_each(|t| t.collect_vars(vars)),
            Value::Array(items) => items.iter().for_each(|t| t.collect_vars(vars)),
            Value::Object(pairs) => pairs.iter().for_each(|(k, v)| {
                k.collect_vars(vars);
                v.collect_vars(vars);
            }),
            Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => (),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprTerms {
    /// A bare term, e.g. a membership test `q[x]`.
    Term(Term),
    /// An operator followed by its operands, e.g. `eq(x, 1)`.
    Call(Vec<Term>),
}

/// One statement of a body.
#[derive(Debug, Clone)]
pub struct Expr {
    pub terms: ExprTerms,
    pub negated: bool,
    // Position within the enclosing body. Diagnostic only.
    pub index: u32,
}

impl Expr {
    pub fn new(term: Term) -> Self {
        Self {
            terms: ExprTerms::Term(term),
            negated: false,
            index: 0,
        }
    }

    pub fn call(terms: Vec<Term>) -> Self {
        Self {
            terms: ExprTerms::Call(terms),
            negated: false,
            index: 0,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Operator term of a call expression.
    pub fn operator(&self) -> Option<&Term> {
        match &self.terms {
            ExprTerms::Call(terms) => terms.first(),
            ExprTerms::Term(_) => None,
        }
    }

    pub fn operands(&self) -> &[Term] {
        match &self.terms {
            ExprTerms::Call(terms) => terms.get(1..).unwrap_or_default(),
            ExprTerms::Term(_) => &[],
        }
    }

    /// The built-in invoked by this expression, resolving infix aliases.
    pub fn builtin(&self) -> Option<&'static Builtin> {
        self.operator()
            .and_then(Term::as_var)
            .and_then(|v| builtins::lookup(v.as_str()))
    }

    pub fn is_equality(&self) -> bool {
        self.builtin()
            .is_some_and(|b| b.name == builtins::EQUALITY.name)
    }

    pub fn is_ground(&self) -> bool {
        match &self.terms {
            ExprTerms::Term(t) => t.is_ground(),
            ExprTerms::Call(_) => self.operands().iter().all(Term::is_ground),
        }
    }

    pub fn vars(&self) -> VarSet {
        let mut vars = VarSet::new();
        match &self.terms {
            ExprTerms::Term(t) => t.collect_vars(&mut vars),
            ExprTerms::Call(_) => self
                .operands()
                .iter()
                .for_each(|t| t.collect_vars(&mut vars)),
        }
        vars
    }
}

/// An ordered conjunction of expressions.
#[derive(Debug, Clone, Default)]
pub struct Body(pub Vec<Expr>);

impl Body {
    /// Builds a body, numbering the expressions by position.
    pub fn new(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self(
            exprs
                .into_iter()
                .enumerate()
                .map(|(i, e)| e.with_index(i as u32))
                .collect(),
        )
    }

    pub fn is_ground(&self) -> bool {
        self.0.iter().all(Expr::is_ground)
    }

    pub fn vars(&self) -> VarSet {
        self.0
            .iter()
            .fold(VarSet::new(), |acc, e| acc.union(&e.vars()))
    }
}

impl Deref for Body {
    type Target = [Expr];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `p = v :- ...` or `p :- ...`
    Complete,
    /// `p[k] :- ...`
    PartialSet,
    /// `p[k] = v :- ...`
    PartialObject,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: Var,
    pub key: Option<Term>,
    pub value: Option<Term>,
    pub body: Body,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: Var::new(""),
            key: None,
            value: None,
            body: Body::default(),
        }
    }
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match (&self.key, &self.value) {
            (None, _) => RuleKind::Complete,
            (Some(_), None) => RuleKind::PartialSet,
            (Some(_), Some(_)) => RuleKind::PartialObject,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    pub path: Term,
    pub alias: Option<Var>,
}

#[derive(Debug, Clone)]
pub struct Package {
    pub path: Ref,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub package: Package,
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
}
