//! UPDATE statements.

use super::{OperationKind, StatementBuilder, collect_names};
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::metadata::{EntityMetadata, PropertyCategory};
use crate::render;
use crate::value::{Props, Value};

impl StatementBuilder {
    /// `UPDATE <table>`; SET follows with `set*`.
    pub fn update(self, table: &str) -> Self {
        let table = table.to_string();
        self.step(move |b| {
            b.establish(OperationKind::Update)?;
            b.write_update(&table)
        })
    }

    /// `UPDATE` the table of `T`, staging its updatable properties.
    ///
    /// The staged properties are written as `col = ?` unless a `set*` call
    /// replaces them before the next clause.
    pub fn update_entity<T: Entity>(self) -> Self {
        self.step(|b| {
            b.establish(OperationKind::Update)?;
            let meta = EntityMetadata::of::<T>();
            let table = meta.table_name(b.naming).to_string();
            b.pending_set = Some(meta.updatable().to_vec());
            b.use_entity(meta);
            b.write_update(&table)
        })
    }

    fn write_update(&mut self, table: &str) -> SqlResult<()> {
        self.push_str("UPDATE ")?;
        self.push_str(table)?;
        self.head_written = true;
        Ok(())
    }

    /// `SET col = <placeholder>` for each property.
    pub fn set<S: AsRef<str>>(self, props: impl IntoIterator<Item = S>) -> Self {
        let names = collect_names(props);
        self.step(move |b| {
            b.prepare_set()?;
            b.write_set_names(&names)
        })
    }

    /// `SET col = value` for each entry of `props`.
    pub fn set_map(self, props: Props) -> Self {
        self.step(move |b| {
            b.prepare_set()?;
            b.write_set_values(props)
        })
    }

    /// Set the updatable properties of `entity`.
    ///
    /// Entities that track changes only contribute their changed properties.
    pub fn set_entity<T: Entity>(self, entity: &T) -> Self {
        self.set_entity_excluding(entity, &[])
    }

    pub fn set_entity_excluding<T: Entity>(self, entity: &T, excluded: &[&str]) -> Self {
        self.step(|b| {
            b.prepare_set()?;
            let meta = EntityMetadata::of::<T>();
            let changed = entity.changed_properties();
            let props: Props = meta
                .properties_excluding(PropertyCategory::Updatable, excluded)
                .into_iter()
                .filter(|p| changed.as_ref().is_none_or(|c| c.contains(p)))
                .map(|prop| {
                    let value = entity.value_of(&prop).unwrap_or(Value::Null);
                    (prop, value)
                })
                .collect();
            b.use_entity(meta);
            if props.is_empty() {
                return Err(SqlError::MissingSet);
            }
            b.write_set_values(props)
        })
    }

    fn prepare_set(&mut self) -> SqlResult<()> {
        self.expect_op("set", &[OperationKind::Update])?;
        if self.clauses_started {
            return Err(SqlError::validation(
                "SET must come before WHERE, IF, ORDER BY and LIMIT",
            ));
        }
        // An explicit SET replaces columns staged by `update_entity`.
        self.pending_set = None;
        Ok(())
    }

    fn write_set_prefix(&mut self) -> SqlResult<()> {
        let prefix = if self.set_written { ", " } else { " SET " };
        self.set_written = true;
        self.push_str(prefix)
    }

    pub(super) fn write_set_names(&mut self, props: &[String]) -> SqlResult<()> {
        if props.is_empty() {
            return Err(SqlError::MissingColumns("SET has no columns".into()));
        }
        self.write_set_prefix()?;
        let columns: Vec<String> = props.iter().map(|p| self.column(p)).collect();
        let (buf, params, ctx) = self.parts()?;
        for (i, (prop, column)) in props.iter().zip(&columns).enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            buf.push_str(column);
            buf.push_str(" = ");
            render::write_value(&Value::Placeholder, prop, &ctx, buf, params)?;
        }
        Ok(())
    }

    fn write_set_values(&mut self, props: Props) -> SqlResult<()> {
        if props.is_empty() {
            return Err(SqlError::MissingColumns("SET has no columns".into()));
        }
        self.write_set_prefix()?;
        let columns: Vec<String> = props.keys().map(|p| self.column(p)).collect();
        let (buf, params, ctx) = self.parts()?;
        for (i, ((prop, value), column)) in props.iter().zip(&columns).enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            buf.push_str(column);
            buf.push_str(" = ");
            render::write_value(value, prop, &ctx, buf, params)?;
        }
        Ok(())
    }
}
