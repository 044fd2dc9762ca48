//! # sqlkit
//!
//! A fluent SQL/CQL statement builder with entity metadata caching.
//!
//! ## Features
//!
//! - **Statement text only**: builders produce text plus an ordered parameter
//!   list; executing it is left to a caller-supplied [`Executor`]
//! - **Naming policies**: `lower_snake`, `UPPER_SNAKE` or `lowerCamel`
//!   columns, with per-property overrides
//! - **Binding policies**: inline literals, `?` placeholders or `:name`
//!   placeholders
//! - **Entity metadata**: `#[derive(Entity)]` describes tables and property
//!   sets once; the result is cached per type and shared across threads
//! - **Condition trees**: a closed [`Condition`] type rendered recursively,
//!   including sub-queries
//! - **Safe defaults**: UPDATE requires SET, builders close after finalize
//!
//! ## Example
//!
//! ```ignore
//! use sqlkit::prelude::*;
//!
//! #[derive(Entity)]
//! #[orm(table = "account")]
//! struct Account {
//!     #[orm(id)]
//!     id: i64,
//!     first_name: String,
//!     #[orm(read_only)]
//!     created_at: chrono::NaiveDateTime,
//! }
//!
//! // SELECT
//! let stmt = SnakePositional::select_from::<Account>()
//!     .where_(Condition::eq("first_name", "Ada"))
//!     .order_by("created_at DESC")
//!     .limit(10)
//!     .build()?;
//!
//! // INSERT
//! let stmt = SnakeNamed::insert_entity(&account).into_entity::<Account>().build()?;
//!
//! // UPDATE
//! let stmt = SnakePositional::update_entity::<Account>()
//!     .where_(Condition::eq("id", Value::Placeholder))
//!     .build()?;
//!
//! // CQL
//! let sql = SnakeInline::delete_from("events")
//!     .using_timestamp(1_700_000_000)
//!     .where_(Condition::eq("id", 42))
//!     .if_exists()
//!     .sql()?;
//! ```

pub mod binding;
pub mod builder;
pub mod condition;
pub mod entity;
pub mod error;
mod expr;
pub mod metadata;
pub mod naming;
pub mod pool;
pub mod prelude;
pub mod render;
pub mod statement;
pub mod value;
pub mod variant;

pub use binding::{BindingPolicy, Param, ParamList};
pub use builder::{OperationKind, StatementBuilder};
pub use condition::{Condition, Operator, SubQuery};
pub use entity::{ChangeTracker, Entity, EntityDescriptor, EntityType, FieldDescriptor, FieldKind};
pub use error::{SqlError, SqlResult};
pub use metadata::{EntityMetadata, PropertyCategory, cached_entity_count, metadata_for};
pub use naming::NamingPolicy;
pub use pool::{BufferPool, PoolConfig, PooledBuffer};
pub use render::{RenderCtx, render, render_to_string};
pub use statement::{Executor, ParamStatement};
pub use value::{Props, Value};
pub use variant::{
    CamelInline, CamelNamed, CamelPositional, SnakeInline, SnakeNamed, SnakePositional,
    StatementVariant, UpperInline, UpperNamed, UpperPositional,
};

#[cfg(feature = "derive")]
pub use sqlkit_derive::Entity;
