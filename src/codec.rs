// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tagged wire encoding of the AST.
//!
//! Every term is written as `{"Value": ..., "Type": ...}` with one of the
//! tags `null`, `boolean`, `number`, `string`, `var`, `ref`, `array` or
//! `object`. Expressions, bodies, rules, imports, packages and modules are
//! records built from those. Decoding validates the input and reports the
//! first problem found as a [`CodecError`].

pub mod error;

use crate::ast::*;
use crate::builtins;
use crate::number::Number;
use crate::utils::is_identifier;
use error::{CodecError, JsonType};

use core::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

type Result<T> = core::result::Result<T, CodecError>;

/// Encode/decode to the tagged JSON wire format.
pub trait Wire: Serialize + Sized {
    fn decode(value: &JsonValue) -> Result<Self>;

    fn encode(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::decode(&value).inspect_err(|e| tracing::debug!(error = %e, "rejected wire input"))
    }

    fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Encoding

struct Pair<'a>(&'a Term, &'a Term);

impl Serialize for Pair<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        (self.0, self.1).serialize(serializer)
    }
}

struct Payload<'a>(&'a Value);

impl Serialize for Payload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Var(v) => serializer.serialize_str(v.as_str()),
            Value::Ref(r) => r.terms().serialize(serializer),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(pairs) => serializer.collect_seq(pairs.iter().map(|(k, v)| Pair(k, v))),
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Value", &Payload(&self.value))?;
        map.serialize_entry("Type", self.value.type_name())?;
        map.end()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        match &self.terms {
            ExprTerms::Term(t) => map.serialize_entry("Terms", t)?,
            ExprTerms::Call(terms) => map.serialize_entry("Terms", terms)?,
        }
        map.serialize_entry("Negated", &self.negated)?;
        map.serialize_entry("Index", &self.index)?;
        map.end()
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Name", self.name.as_str())?;
        if let Some(key) = &self.key {
            map.serialize_entry("Key", key)?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("Value", value)?;
        }
        map.serialize_entry("Body", &self.body)?;
        map.end()
    }
}

impl Serialize for Import {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Path", &self.path)?;
        if let Some(alias) = &self.alias {
            map.serialize_entry("Alias", alias.as_str())?;
        }
        map.end()
    }
}

impl Serialize for Package {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Path", self.path.terms())?;
        map.end()
    }
}

impl Serialize for Module {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("Package", &self.package)?;
        map.serialize_entry("Imports", &self.imports)?;
        map.serialize_entry("Rules", &self.rules)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Decoding

#[derive(Clone, Copy)]
enum Segment {
    Field(&'static str),
    Index(usize),
}

/// Position of a term within the record being decoded. Rendered only on error.
#[derive(Clone, Copy)]
struct Path<'a> {
    parent: Option<&'a Path<'a>>,
    segment: Option<Segment>,
}

static ROOT: Path<'static> = Path {
    parent: None,
    segment: None,
};

impl<'a> Path<'a> {
    fn field(&'a self, name: &'static str) -> Path<'a> {
        Path {
            parent: Some(self),
            segment: Some(Segment::Field(name)),
        }
    }

    fn index(&'a self, idx: usize) -> Path<'a> {
        Path {
            parent: Some(self),
            segment: Some(Segment::Index(idx)),
        }
    }

    fn render(&self) -> String {
        let mut segments = vec![];
        let mut node = Some(self);
        while let Some(p) = node {
            if let Some(s) = p.segment {
                segments.push(s);
            }
            node = p.parent;
        }

        let mut out = String::new();
        for s in segments.into_iter().rev() {
            match s {
                Segment::Field(name) if out.is_empty() => out.push_str(name),
                Segment::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                Segment::Index(i) => out.push_str(&format!("[{i}]")),
            }
        }
        out
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::Term {
            path: self.render(),
            reason: reason.into(),
        }
    }
}

fn as_object<'v>(node: &'static str, v: &'v JsonValue) -> Result<&'v Map<String, JsonValue>> {
    v.as_object().ok_or(CodecError::Node {
        node,
        actual: JsonType::of(Some(v)),
    })
}

fn field_error(field: &'static str, v: Option<&JsonValue>, expected: &'static str) -> CodecError {
    CodecError::Field {
        field,
        actual: JsonType::of(v),
        expected,
    }
}

fn decode_terms_list(items: &[JsonValue], path: &Path) -> Result<Vec<Term>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_term_at(item, &path.index(i)))
        .collect()
}

fn decode_term_at(v: &JsonValue, path: &Path) -> Result<Term> {
    let obj = v.as_object().ok_or_else(|| {
        path.error(format!(
            "expected {{\"Value\": ..., \"Type\": ...}}, found {}",
            JsonType::of(Some(v))
        ))
    })?;

    let tag = match obj.get("Type") {
        Some(JsonValue::String(tag)) => tag.as_str(),
        other => {
            return Err(path.error(format!("Type must be a string, found {}", JsonType::of(other))))
        }
    };

    let payload = obj.get("Value");
    let vpath = path.field("Value");
    let mismatch = |expected: &str| {
        path.error(format!(
            "{tag} term expects {expected} Value, found {}",
            JsonType::of(payload)
        ))
    };

    let value = match (tag, payload) {
        ("null", Some(JsonValue::Null)) => Value::Null,
        ("null", _) => return Err(mismatch("a null")),
        ("boolean", Some(JsonValue::Bool(b))) => Value::Boolean(*b),
        ("boolean", _) => return Err(mismatch("a boolean")),
        ("number", Some(JsonValue::Number(n))) => {
            let text = n.to_string();
            match Number::from_str(&text) {
                Ok(n) => Value::Number(n),
                Err(_) => return Err(path.error(format!("invalid number {text}"))),
            }
        }
        ("number", _) => return Err(mismatch("a number")),
        ("string", Some(JsonValue::String(s))) => Value::String(s.as_str().into()),
        ("string", _) => return Err(mismatch("a string")),
        ("var", Some(JsonValue::String(s))) if is_identifier(s) => Value::Var(Var::new(s)),
        ("var", _) => return Err(mismatch("an identifier")),
        ("ref", Some(JsonValue::Array(items))) => {
            let terms = decode_terms_list(items, &vpath)?;
            match terms.first() {
                Some(base) if base.as_var().is_some() => Value::Ref(Ref::new(terms)),
                Some(_) => return Err(path.error("ref base must be a var")),
                None => return Err(path.error("ref must not be empty")),
            }
        }
        ("ref", _) => return Err(mismatch("an array")),
        ("array", Some(JsonValue::Array(items))) => Value::Array(decode_terms_list(items, &vpath)?),
        ("array", _) => return Err(mismatch("an array")),
        ("object", Some(JsonValue::Array(items))) => {
            let mut pairs: Vec<(Term, Term)> = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let ipath = vpath.index(i);
                let (k, val) = match item.as_array().map(Vec::as_slice) {
                    Some([k, val]) => (
                        decode_term_at(k, &ipath.index(0))?,
                        decode_term_at(val, &ipath.index(1))?,
                    ),
                    _ => return Err(ipath.error("object item must be a [key, value] pair")),
                };
                if pairs.iter().any(|(existing, _)| *existing == k) {
                    return Err(ipath.error(format!("duplicate object key {k}")));
                }
                pairs.push((k, val));
            }
            Value::Object(pairs)
        }
        ("object", _) => return Err(mismatch("a pair array as")),
        (tag, _) => return Err(path.error(format!("unknown term type {tag:?}"))),
    };

    Ok(Term::new(value))
}

// A built-in operator may be spelled by its infix alias, e.g. `=`. It is
// decoded under its canonical name, as the parser would produce it.
fn decode_operator(v: &JsonValue, path: &Path) -> Result<Term> {
    let builtin = match (v.get("Type"), v.get("Value")) {
        (Some(JsonValue::String(tag)), Some(JsonValue::String(name))) if tag == "var" => {
            builtins::lookup(name)
        }
        _ => None,
    };
    match builtin {
        Some(b) => Ok(Term::var(b.name)),
        None => decode_term_at(v, path),
    }
}

pub fn decode_term(v: &JsonValue) -> Result<Term> {
    decode_term_at(v, &ROOT)
}

pub fn decode_expr(v: &JsonValue) -> Result<Expr> {
    let obj = as_object("Expr", v)?;

    let negated = match obj.get("Negated") {
        None => false,
        Some(JsonValue::Bool(b)) => *b,
        other => {
            return Err(CodecError::Negated {
                actual: JsonType::of(other),
            })
        }
    };

    let terms_path = ROOT.field("Terms");
    let terms = match obj.get("Terms") {
        Some(t @ JsonValue::Object(_)) => ExprTerms::Term(decode_term_at(t, &terms_path)?),
        Some(JsonValue::Array(items)) if !items.is_empty() => {
            let mut terms = vec![decode_operator(&items[0], &terms_path.index(0))?];
            for (i, item) in items.iter().enumerate().skip(1) {
                terms.push(decode_term_at(item, &terms_path.index(i))?);
            }
            ExprTerms::Call(terms)
        }
        other => {
            return Err(CodecError::Terms {
                actual: JsonType::of(other),
            })
        }
    };

    let index = match obj.get("Index") {
        Some(JsonValue::Number(n)) => n.as_u64().and_then(|i| u32::try_from(i).ok()),
        _ => None,
    }
    .ok_or(CodecError::Index {
        actual: JsonType::of(obj.get("Index")),
    })?;

    Ok(Expr {
        terms,
        negated,
        index,
    })
}

pub fn decode_body(v: &JsonValue) -> Result<Body> {
    match v {
        JsonValue::Array(items) if !items.is_empty() => {
            Ok(Body(items.iter().map(decode_expr).collect::<Result<_>>()?))
        }
        _ => Err(field_error("Body", Some(v), "non-empty array of expressions")),
    }
}

fn optional_term(obj: &Map<String, JsonValue>, field: &'static str) -> Result<Option<Term>> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(t) => Ok(Some(decode_term_at(t, &ROOT.field(field))?)),
    }
}

fn optional_var(obj: &Map<String, JsonValue>, field: &'static str) -> Result<Option<Var>> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if is_identifier(s) => Ok(Some(Var::new(s))),
        other => Err(field_error(field, other, "identifier")),
    }
}

fn optional_list<'v>(
    obj: &'v Map<String, JsonValue>,
    field: &'static str,
) -> Result<&'v [JsonValue]> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Ok(&[]),
        Some(JsonValue::Array(items)) => Ok(items),
        other => Err(field_error(field, other, "array")),
    }
}

pub fn decode_rule(v: &JsonValue) -> Result<Rule> {
    let obj = as_object("Rule", v)?;

    let name = match obj.get("Name") {
        Some(JsonValue::String(s)) if is_identifier(s) => Var::new(s),
        other => return Err(field_error("Name", other, "identifier")),
    };

    let body = match obj.get("Body") {
        Some(b) => decode_body(b)?,
        None => return Err(field_error("Body", None, "non-empty array of expressions")),
    };

    Ok(Rule {
        name,
        key: optional_term(obj, "Key")?,
        value: optional_term(obj, "Value")?,
        body,
    })
}

pub fn decode_import(v: &JsonValue) -> Result<Import> {
    let obj = as_object("Import", v)?;
    let path = match obj.get("Path") {
        Some(p) => decode_term_at(p, &ROOT.field("Path"))?,
        None => return Err(field_error("Path", None, "var or ref term")),
    };
    if !matches!(path.value, Value::Var(_) | Value::Ref(_)) {
        return Err(ROOT
            .field("Path")
            .error(format!("import path must be a var or ref, found {}", path.value.type_name())));
    }

    Ok(Import {
        path,
        alias: optional_var(obj, "Alias")?,
    })
}

pub fn decode_package(v: &JsonValue) -> Result<Package> {
    let obj = as_object("Package", v)?;
    let path = ROOT.field("Path");
    let terms = match obj.get("Path") {
        Some(JsonValue::Array(items)) if !items.is_empty() => decode_terms_list(items, &path)?,
        other => return Err(field_error("Path", other, "non-empty array of terms")),
    };
    if terms[0].as_var().map(Var::as_str) != Some(ROOT_DOCUMENT) {
        return Err(path
            .index(0)
            .error(format!("package path must start with {ROOT_DOCUMENT}")));
    }
    // The first key is written bare after `package`, the rest as ref keys.
    match terms.get(1).and_then(Term::as_str) {
        Some(s) if is_identifier(s) => (),
        _ => return Err(path.index(1).error("package name must be an identifier string")),
    }
    if let Some(i) = (2..terms.len()).find(|&i| terms[i].as_str().is_none()) {
        return Err(path.index(i).error("package path keys must be strings"));
    }
    Ok(Package {
        path: Ref::new(terms),
    })
}

pub fn decode_module(v: &JsonValue) -> Result<Module> {
    let obj = as_object("Module", v)?;

    let package = match obj.get("Package") {
        Some(p) => decode_package(p)?,
        None => return Err(field_error("Package", None, "object")),
    };

    let imports = optional_list(obj, "Imports")?
        .iter()
        .map(decode_import)
        .collect::<Result<_>>()?;
    let rules = optional_list(obj, "Rules")?
        .iter()
        .map(decode_rule)
        .collect::<Result<_>>()?;

    Ok(Module {
        package,
        imports,
        rules,
    })
}

macro_rules! wire_impl {
    ($ty:ty, $decode:ident) => {
        impl Wire for $ty {
            fn decode(value: &JsonValue) -> Result<Self> {
                $decode(value)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = JsonValue::deserialize(deserializer)?;
                $decode(&value).map_err(de::Error::custom)
            }
        }
    };
}

wire_impl!(Term, decode_term);
wire_impl!(Expr, decode_expr);
wire_impl!(Body, decode_body);
wire_impl!(Rule, decode_rule);
wire_impl!(Import, decode_import);
wire_impl!(Package, decode_package);
wire_impl!(Module, decode_module);
