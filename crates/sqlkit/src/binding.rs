//! Parameter binding policies and parameter storage.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// How bound values are written into a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingPolicy {
    /// Values are rendered as literals; no parameters are recorded.
    InlineLiteral,
    /// Values become `?` and are recorded in call order.
    PositionalPlaceholder,
    /// Values become `:name` and are recorded with their name.
    NamedPlaceholder,
}

impl BindingPolicy {
    /// Write the placeholder symbol for a parameter called `name`.
    pub(crate) fn write_placeholder(self, name: &str, out: &mut String) {
        match self {
            BindingPolicy::InlineLiteral | BindingPolicy::PositionalPlaceholder => out.push('?'),
            BindingPolicy::NamedPlaceholder => {
                out.push(':');
                out.push_str(name);
            }
        }
    }
}

/// A recorded parameter.
///
/// `name` is only set under [`BindingPolicy::NamedPlaceholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub value: Value,
}

impl Param {
    pub fn positional(value: Value) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// An append-only, ordered collection of parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Move all parameters of `other` to the end of this list.
    pub fn append(&mut self, other: &mut ParamList) {
        self.params.append(&mut other.params);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn into_vec(self) -> Vec<Param> {
        self.params
    }
}
