//! Raw expression formalization.
//!
//! Raw text handed to `where_expr`, `order_by`, `group_by` and join `ON`
//! clauses is split into tokens. Identifier tokens are resolved through the
//! naming policy unless they are keywords or function names (immediately
//! followed by `(`). Everything else is copied verbatim: whitespace,
//! operators, punctuation, numbers, quoted literals and placeholders such as
//! `?`, `:name` or `#{name}`.

use crate::naming::{self, NamingPolicy};
use std::collections::HashMap;

const KEYWORDS: &[&str] = &[
    "ALL", "ALLOW", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CROSS", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "DELETE", "DESC", "DISTINCT", "ELSE",
    "END", "EXCEPT", "EXISTS", "FALSE", "FILTERING", "FROM", "FULL", "GROUP", "HAVING", "IF", "IN",
    "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "LOCALTIME",
    "LOCALTIMESTAMP", "NOT", "NULL", "NULLS", "OFFSET", "ON", "OR", "ORDER", "OUTER", "RIGHT",
    "SELECT", "SET", "SOME", "THEN", "TRUE", "TTL", "UNION", "UPDATE", "USING", "VALUES", "WHEN",
    "WHERE",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn is_word_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Write `expr` into `out`, resolving column references.
pub(crate) fn write_formalized(
    expr: &str,
    policy: NamingPolicy,
    overrides: &HashMap<String, String>,
    out: &mut String,
) {
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Quoted literal or quoted identifier.
        if c == '\'' || c == '"' || c == '`' {
            let start = i;
            i += 1;
            while i < chars.len() {
                if chars[i] == c {
                    // Doubled quote is an escape.
                    if i + 1 < chars.len() && chars[i + 1] == c {
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
            out.extend(&chars[start..i]);
            continue;
        }

        // Named placeholders: `:name`, `@name`, `$1`.
        if (c == ':' || c == '@' || c == '$') && i + 1 < chars.len() && is_word_char(chars[i + 1]) {
            let start = i;
            i += 1;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            out.extend(&chars[start..i]);
            continue;
        }

        // `#{name}`
        if c == '#' && i + 1 < chars.len() && chars[i + 1] == '{' {
            let start = i;
            while i < chars.len() && chars[i] != '}' {
                i += 1;
            }
            i = (i + 1).min(chars.len());
            out.extend(&chars[start..i]);
            continue;
        }

        if is_word_start(c) {
            let start = i;
            while i < chars.len() {
                if is_word_char(chars[i]) {
                    i += 1;
                } else if chars[i] == '.'
                    && i + 1 < chars.len()
                    && (is_word_start(chars[i + 1]) || chars[i + 1] == '*')
                {
                    i += 1;
                } else {
                    break;
                }
            }
            let word: String = chars[start..i].iter().collect();
            let is_function = i < chars.len() && chars[i] == '(';
            if is_function || is_keyword(&word) {
                out.push_str(&word);
            } else {
                out.push_str(&naming::resolve(policy, overrides, &word));
            }
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (is_word_char(chars[i]) || chars[i] == '.') {
                i += 1;
            }
            out.extend(&chars[start..i]);
            continue;
        }

        out.push(c);
        i += 1;
    }
}
