//! Property → column naming policies.
//!
//! A [`NamingPolicy`] is a pure transform applied to property names that have
//! no explicit column override:
//!
//! | policy       | `firstName`  |
//! |--------------|--------------|
//! | `LowerSnake` | `first_name` |
//! | `UpperSnake` | `FIRST_NAME` |
//! | `LowerCamel` | `firstName`  |
//!
//! Dotted names are converted per segment (`acc.firstName` → `acc.first_name`).
//! Segments that are not plain identifiers (`*`, `COUNT(*)`, quoted text) are
//! left untouched.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How property names are turned into column and table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamingPolicy {
    LowerSnake,
    UpperSnake,
    LowerCamel,
}

impl NamingPolicy {
    /// All policies, in the order table names are cached.
    pub const ALL: [NamingPolicy; 3] = [
        NamingPolicy::LowerSnake,
        NamingPolicy::UpperSnake,
        NamingPolicy::LowerCamel,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            NamingPolicy::LowerSnake => 0,
            NamingPolicy::UpperSnake => 1,
            NamingPolicy::LowerCamel => 2,
        }
    }

    /// Apply this policy to a name, ignoring any override table.
    pub fn convert(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, segment) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.convert_segment(segment, &mut out);
        }
        out
    }

    fn convert_segment(self, segment: &str, out: &mut String) {
        if !is_plain_identifier(segment) {
            out.push_str(segment);
            return;
        }

        let body = segment.trim_start_matches('_');
        out.push_str(&segment[..segment.len() - body.len()]);
        if body.is_empty() {
            return;
        }
        match self {
            NamingPolicy::LowerSnake => out.push_str(&body.to_snake_case()),
            NamingPolicy::UpperSnake => out.push_str(&body.to_shouty_snake_case()),
            NamingPolicy::LowerCamel => out.push_str(&body.to_lower_camel_case()),
        }
    }
}

/// Resolve the column name for `prop`.
///
/// An entry in `overrides` always wins and is returned verbatim.
pub fn resolve(policy: NamingPolicy, overrides: &HashMap<String, String>, prop: &str) -> String {
    match overrides.get(prop) {
        Some(column) => column.clone(),
        None => policy.convert(prop),
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
