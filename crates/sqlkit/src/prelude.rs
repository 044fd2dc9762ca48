//! Convenient imports for typical `sqlkit` usage.
//!
//! ```ignore
//! use sqlkit::prelude::*;
//! ```

pub use crate::{
    BindingPolicy, ChangeTracker, Condition, Entity, Executor, NamingPolicy, Operator,
    ParamStatement, Props, SqlError, SqlResult, StatementBuilder, StatementVariant, Value,
};

pub use crate::{
    CamelInline, CamelNamed, CamelPositional, SnakeInline, SnakeNamed, SnakePositional,
    UpperInline, UpperNamed, UpperPositional,
};
