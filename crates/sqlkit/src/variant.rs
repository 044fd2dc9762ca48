//! Named builder entry points, one per naming and binding policy pair.
//!
//! ```ignore
//! use sqlkit::prelude::*;
//!
//! let stmt = SnakePositional::select(["firstName", "lastName"])
//!     .from("account")
//!     .where_(Condition::eq("id", 1))
//!     .build()?;
//! assert_eq!(
//!     stmt.sql(),
//!     r#"SELECT first_name AS "firstName", last_name AS "lastName" FROM account WHERE id = ?"#
//! );
//! ```

use crate::binding::BindingPolicy;
use crate::builder::StatementBuilder;
use crate::entity::Entity;
use crate::naming::NamingPolicy;
use crate::value::Props;

/// A fixed (naming, binding) configuration with factory shortcuts.
pub trait StatementVariant {
    const NAMING: NamingPolicy;
    const BINDING: BindingPolicy;

    /// A fresh builder with this variant's policies.
    fn builder() -> StatementBuilder {
        StatementBuilder::new(Self::NAMING, Self::BINDING)
    }

    fn insert<S: AsRef<str>>(props: impl IntoIterator<Item = S>) -> StatementBuilder {
        Self::builder().insert(props)
    }

    fn insert_map(props: Props) -> StatementBuilder {
        Self::builder().insert_map(props)
    }

    fn insert_maps(rows: impl IntoIterator<Item = Props>) -> StatementBuilder {
        Self::builder().insert_maps(rows)
    }

    fn insert_entity<T: Entity>(entity: &T) -> StatementBuilder {
        Self::builder().insert_entity(entity)
    }

    /// `INSERT INTO <table of T> (<insertable>) VALUES (<placeholders>)`.
    fn insert_into<T: Entity>() -> StatementBuilder {
        Self::builder().insert_entity_type::<T>().into_entity::<T>()
    }

    fn select<S: AsRef<str>>(props: impl IntoIterator<Item = S>) -> StatementBuilder {
        Self::builder().select(props)
    }

    /// Select with explicit `(prop, alias)` pairs.
    fn select_aliases<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> StatementBuilder
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::builder().select_aliases(pairs)
    }

    fn select_entity<T: Entity>() -> StatementBuilder {
        Self::builder().select_entity::<T>()
    }

    /// `SELECT <selectable of T> FROM <table of T>`.
    fn select_from<T: Entity>() -> StatementBuilder {
        Self::builder().select_entity::<T>().from_entity::<T>()
    }

    fn update(table: &str) -> StatementBuilder {
        Self::builder().update(table)
    }

    fn update_entity<T: Entity>() -> StatementBuilder {
        Self::builder().update_entity::<T>()
    }

    fn delete<S: AsRef<str>>(props: impl IntoIterator<Item = S>) -> StatementBuilder {
        Self::builder().delete(props)
    }

    fn delete_from(table: &str) -> StatementBuilder {
        Self::builder().delete_from(table)
    }

    fn delete_from_entity<T: Entity>() -> StatementBuilder {
        Self::builder().delete_from_entity::<T>()
    }
}

macro_rules! variants {
    ($($(#[$doc:meta])* $name:ident => ($naming:ident, $binding:ident);)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl StatementVariant for $name {
                const NAMING: NamingPolicy = NamingPolicy::$naming;
                const BINDING: BindingPolicy = BindingPolicy::$binding;
            }
        )*
    };
}

variants! {
    /// `lower_snake` columns, inline literals.
    SnakeInline => (LowerSnake, InlineLiteral);
    /// `lower_snake` columns, `?` placeholders.
    SnakePositional => (LowerSnake, PositionalPlaceholder);
    /// `lower_snake` columns, `:name` placeholders.
    SnakeNamed => (LowerSnake, NamedPlaceholder);
    /// `UPPER_SNAKE` columns, inline literals.
    UpperInline => (UpperSnake, InlineLiteral);
    /// `UPPER_SNAKE` columns, `?` placeholders.
    UpperPositional => (UpperSnake, PositionalPlaceholder);
    /// `UPPER_SNAKE` columns, `:name` placeholders.
    UpperNamed => (UpperSnake, NamedPlaceholder);
    /// `lowerCamel` columns, inline literals.
    CamelInline => (LowerCamel, InlineLiteral);
    /// `lowerCamel` columns, `?` placeholders.
    CamelPositional => (LowerCamel, PositionalPlaceholder);
    /// `lowerCamel` columns, `:name` placeholders.
    CamelNamed => (LowerCamel, NamedPlaceholder);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies<V: StatementVariant>() -> (NamingPolicy, BindingPolicy) {
        let b = V::builder();
        (b.naming(), b.binding())
    }

    #[test]
    fn each_variant_carries_its_policies() {
        use BindingPolicy::*;
        use NamingPolicy::*;

        assert_eq!(policies::<SnakeInline>(), (LowerSnake, InlineLiteral));
        assert_eq!(policies::<SnakePositional>(), (LowerSnake, PositionalPlaceholder));
        assert_eq!(policies::<SnakeNamed>(), (LowerSnake, NamedPlaceholder));
        assert_eq!(policies::<UpperInline>(), (UpperSnake, InlineLiteral));
        assert_eq!(policies::<UpperPositional>(), (UpperSnake, PositionalPlaceholder));
        assert_eq!(policies::<UpperNamed>(), (UpperSnake, NamedPlaceholder));
        assert_eq!(policies::<CamelInline>(), (LowerCamel, InlineLiteral));
        assert_eq!(policies::<CamelPositional>(), (LowerCamel, PositionalPlaceholder));
        assert_eq!(policies::<CamelNamed>(), (LowerCamel, NamedPlaceholder));
    }

    #[test]
    fn same_call_differs_only_by_policy() {
        let upper = UpperNamed::update("ACCOUNT")
            .set(["lastName"])
            .where_(crate::Condition::eq("id", 1))
            .sql()
            .unwrap();
        assert_eq!(upper, "UPDATE ACCOUNT SET LAST_NAME = :lastName WHERE ID = :id");

        let camel = CamelInline::update("account")
            .set(["lastName"])
            .where_(crate::Condition::eq("id", 1))
            .sql()
            .unwrap();
        assert_eq!(camel, "UPDATE account SET lastName = ? WHERE id = 1");
    }
}
