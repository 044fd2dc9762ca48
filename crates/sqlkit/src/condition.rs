//! Condition expression tree.
//!
//! [`Condition`] is a closed sum type; the renderer matches it exhaustively.
//!
//! ```ignore
//! use sqlkit::Condition;
//!
//! let cond = Condition::and(vec![
//!     Condition::eq("status", "active"),
//!     Condition::or(vec![Condition::gt("age", 18), Condition::is_null("age")]),
//! ]);
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operators used by condition nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Like,
    NotLike,
    Is,
    IsNot,
    Between,
    NotBetween,
    In,
    NotIn,
    And,
    Or,
    Not,
    Exists,
    NotExists,
}

impl Operator {
    /// The dialect text of this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT EXISTS",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A nested SELECT used inside a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubQuery {
    /// Pre-rendered statement text, emitted verbatim.
    Raw(String),
    /// Rendered with the enclosing builder's naming and binding policies.
    Select {
        props: Vec<String>,
        entity_name: String,
        condition: Box<Condition>,
    },
}

/// Condition expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `prop <op> value`
    Binary {
        prop: String,
        op: Operator,
        value: Value,
    },
    /// `prop BETWEEN min AND max`
    Between {
        prop: String,
        op: Operator,
        min: Value,
        max: Value,
    },
    /// `prop IN (v1, v2, ...)`
    In {
        prop: String,
        op: Operator,
        values: Vec<Value>,
    },
    /// Unary wrapper: `NOT (inner)`, `EXISTS (inner)`.
    Cell { op: Operator, inner: Box<Condition> },
    /// AND/OR group; must contain at least one child when rendered.
    Junction { op: Operator, children: Vec<Condition> },
    SubQuery(SubQuery),
    /// Opaque text, emitted verbatim and never passed through naming.
    Expression(String),
}

impl Condition {
    /// Create a binary condition with an explicit operator.
    pub fn binary(prop: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::Binary {
            prop: prop.into(),
            op,
            value: value.into(),
        }
    }

    /// Create an equality condition: prop = value
    pub fn eq(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::Equal, value)
    }

    /// Create an inequality condition: prop != value
    pub fn ne(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::NotEqual, value)
    }

    /// Create a greater-than condition: prop > value
    pub fn gt(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::GreaterThan, value)
    }

    /// Create a greater-than-or-equal condition: prop >= value
    pub fn ge(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::GreaterEqual, value)
    }

    /// Create a less-than condition: prop < value
    pub fn lt(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::LessThan, value)
    }

    /// Create a less-than-or-equal condition: prop <= value
    pub fn le(prop: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::LessEqual, value)
    }

    /// Create a LIKE condition: prop LIKE pattern
    pub fn like(prop: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::Like, pattern)
    }

    /// Create a NOT LIKE condition: prop NOT LIKE pattern
    pub fn not_like(prop: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::binary(prop, Operator::NotLike, pattern)
    }

    /// Create an IS NULL condition: prop IS NULL
    pub fn is_null(prop: impl Into<String>) -> Self {
        Self::binary(prop, Operator::Is, Value::expr("NULL"))
    }

    /// Create an IS NOT NULL condition: prop IS NOT NULL
    pub fn is_not_null(prop: impl Into<String>) -> Self {
        Self::binary(prop, Operator::IsNot, Value::expr("NULL"))
    }

    /// Create a BETWEEN condition: prop BETWEEN min AND max
    pub fn between(prop: impl Into<String>, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Condition::Between {
            prop: prop.into(),
            op: Operator::Between,
            min: min.into(),
            max: max.into(),
        }
    }

    /// Create a NOT BETWEEN condition: prop NOT BETWEEN min AND max
    pub fn not_between(
        prop: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Self {
        Condition::Between {
            prop: prop.into(),
            op: Operator::NotBetween,
            min: min.into(),
            max: max.into(),
        }
    }

    /// Create an IN condition: prop IN (values...)
    pub fn in_list<V: Into<Value>>(prop: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Condition::In {
            prop: prop.into(),
            op: Operator::In,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a NOT IN condition: prop NOT IN (values...)
    pub fn not_in<V: Into<Value>>(prop: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Condition::In {
            prop: prop.into(),
            op: Operator::NotIn,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an AND group.
    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Junction {
            op: Operator::And,
            children,
        }
    }

    /// Create an OR group.
    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Junction {
            op: Operator::Or,
            children,
        }
    }

    /// Create a NOT wrapper.
    pub fn not(inner: Condition) -> Self {
        Condition::Cell {
            op: Operator::Not,
            inner: Box::new(inner),
        }
    }

    /// Create an EXISTS wrapper around a sub-query.
    pub fn exists(sub_query: Condition) -> Self {
        Condition::Cell {
            op: Operator::Exists,
            inner: Box::new(sub_query),
        }
    }

    /// Create a NOT EXISTS wrapper around a sub-query.
    pub fn not_exists(sub_query: Condition) -> Self {
        Condition::Cell {
            op: Operator::NotExists,
            inner: Box::new(sub_query),
        }
    }

    /// Create a sub-query from pre-rendered text.
    pub fn sub_query_raw(sql: impl Into<String>) -> Self {
        Condition::SubQuery(SubQuery::Raw(sql.into()))
    }

    /// Create a sub-query `SELECT <props> FROM <entity_name> WHERE <condition>`.
    /// `entity_name` is written as given, like `from(table)`.
    pub fn sub_query<S: Into<String>>(
        entity_name: impl Into<String>,
        props: impl IntoIterator<Item = S>,
        condition: Condition,
    ) -> Self {
        Condition::SubQuery(SubQuery::Select {
            props: props.into_iter().map(Into::into).collect(),
            entity_name: entity_name.into(),
            condition: Box::new(condition),
        })
    }

    /// Create an opaque expression.
    pub fn expr(text: impl Into<String>) -> Self {
        Condition::Expression(text.into())
    }

    /// Combine with another condition using AND, flattening AND groups.
    pub fn and_also(self, other: Condition) -> Self {
        self.combine(Operator::And, other)
    }

    /// Combine with another condition using OR, flattening OR groups.
    pub fn or_else(self, other: Condition) -> Self {
        self.combine(Operator::Or, other)
    }

    fn combine(self, op: Operator, other: Condition) -> Self {
        match self {
            Condition::Junction { op: own, mut children } if own == op => {
                children.push(other);
                Condition::Junction { op, children }
            }
            first => Condition::Junction {
                op,
                children: vec![first, other],
            },
        }
    }
}
