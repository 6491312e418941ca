// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::Var;

use std::collections::BTreeSet;

use core::fmt;

/// A set of variables. Iteration order is lexicographic by name, independent
/// of the order in which variables were added.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VarSet {
    vars: BTreeSet<Var>,
}

impl VarSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, v: Var) {
        self.vars.insert(v);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains(name)
    }

    pub fn union(&self, other: &VarSet) -> VarSet {
        Self {
            vars: self.vars.union(&other.vars).cloned().collect(),
        }
    }

    /// Variables in `self` that are not in `other`.
    pub fn diff(&self, other: &VarSet) -> VarSet {
        Self {
            vars: self.vars.difference(&other.vars).cloned().collect(),
        }
    }

    pub fn extend(&mut self, other: &VarSet) {
        self.vars.extend(other.vars.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.vars.iter()
    }
}

impl FromIterator<Var> for VarSet {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for VarSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Var::new).collect()
    }
}

impl IntoIterator for VarSet {
    type Item = Var;
    type IntoIter = std::collections::btree_set::IntoIter<Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

impl fmt::Debug for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vars.iter()).finish()
    }
}

impl fmt::Display for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, v) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(v.as_str())?;
        }
        f.write_str("}")
    }
}
