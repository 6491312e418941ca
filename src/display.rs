// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Canonical text form. The output of every `Display` impl here parses back
//! into a node equal to the one rendered.

use crate::ast::*;
use crate::utils::is_identifier;

use core::fmt::{self, Display, Formatter};

fn write_joined<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

fn write_ref_key(f: &mut Formatter<'_>, key: &Term) -> fmt::Result {
    match key.as_str() {
        Some(s) if is_identifier(s) => write!(f, ".{s}"),
        _ => write!(f, "[{key}]"),
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(base) = self.base() {
            base.fmt(f)?;
        }
        for key in self.keys() {
            write_ref_key(f, key)?;
        }
        Ok(())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => n.fmt(f),
            Value::String(s) => {
                let quoted = serde_json::to_string(&**s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Value::Var(v) => v.fmt(f),
            Value::Ref(r) => r.fmt(f),
            Value::Array(items) => {
                f.write_str("[")?;
                write_joined(f, items, ", ")?;
                f.write_str("]")
            }
            Value::Object(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        match &self.terms {
            ExprTerms::Term(t) => t.fmt(f),
            ExprTerms::Call(terms) => {
                match (self.builtin(), terms.first()) {
                    (Some(b), _) => f.write_str(b.name)?,
                    (None, Some(op)) => op.fmt(f)?,
                    (None, None) => (),
                }
                f.write_str("(")?;
                write_joined(f, self.operands(), ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0, ", ")
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if let Some(key) = &self.key {
            write!(f, "[{key}]")?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        if !self.body.is_empty() {
            write!(f, " :- {}", self.body)?;
        }
        Ok(())
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "import {}", self.path)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl Display for Package {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("package ")?;
        // The root document is implied.
        let mut keys = self.path.keys().iter();
        match keys.next() {
            Some(first) => match first.as_str() {
                Some(s) => f.write_str(s)?,
                None => first.fmt(f)?,
            },
            None => return Ok(()),
        }
        for key in keys {
            write_ref_key(f, key)?;
        }
        Ok(())
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.package)?;
        writeln!(f)?;
        for import in &self.imports {
            writeln!(f, "{import}")?;
        }
        if !self.imports.is_empty() {
            writeln!(f)?;
        }
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
