// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Abstract syntax and static analysis core for a Rego-style policy language.
//!
//! The crate models terms, expressions, rules, imports, packages and modules
//! and provides structural equality, a canonical re-parseable text form, a
//! tagged JSON wire codec and the per-expression variable safety analysis.

mod ast;
mod builtins;
mod codec;
mod display;
mod equality;
mod lexer;
mod number;
mod parser;
mod safety;
mod utils;
mod varset;

#[cfg(feature = "arc")]
pub(crate) use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub(crate) use std::rc::Rc;

pub use ast::*;
pub use builtins::{lookup as lookup_builtin, Builtin, BUILTINS, EQUALITY};
pub use codec::error::{CodecError, JsonType};
pub use codec::{
    decode_body, decode_expr, decode_import, decode_module, decode_package, decode_rule,
    decode_term, Wire,
};
pub use lexer::{Lexer, Source, Span, Token, TokenKind};
pub use number::{Decimal, Number};
pub use parser::{parse_body, parse_module, parse_term, Parser};
pub use varset::VarSet;
