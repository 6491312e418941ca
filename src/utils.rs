// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;

pub const KEYWORDS: [&str; 7] = ["as", "false", "import", "not", "null", "package", "true"];

pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// True if `s` can be written as a bare identifier, e.g. after a `.` in a ref.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_keyword(s)
}

/// Dotted form of a path ref, e.g. `data.a.b` for `["data", "a", "b"]`.
/// Returns `None` when a key is not an identifier string.
pub fn get_path_string(path: &Ref) -> Option<String> {
    let mut comps: Vec<&str> = vec![path.base()?.as_var()?.as_str()];
    for key in path.keys() {
        match key.as_str() {
            Some(s) if is_identifier(s) => comps.push(s),
            _ => return None,
        }
    }
    Some(comps.join("."))
}
