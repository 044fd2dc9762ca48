//! DELETE statements.

use super::{ColumnSource, OperationKind, StatementBuilder, collect_names};
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::metadata::EntityMetadata;

impl StatementBuilder {
    /// CQL column delete: `DELETE <cols> FROM <table>` once `from` is called.
    pub fn delete<S: AsRef<str>>(self, props: impl IntoIterator<Item = S>) -> Self {
        let names = collect_names(props);
        self.step(|b| b.stage(OperationKind::Delete, ColumnSource::Names(names)))
    }

    /// `DELETE FROM <table>`.
    pub fn delete_from(self, table: &str) -> Self {
        let table = table.to_string();
        self.step(move |b| {
            b.establish(OperationKind::Delete)?;
            b.write_delete_columns(&table)
        })
    }

    /// `DELETE FROM` the table of `T`.
    pub fn delete_from_entity<T: Entity>(self) -> Self {
        self.step(|b| {
            b.establish(OperationKind::Delete)?;
            let meta = EntityMetadata::of::<T>();
            let table = meta.table_name(b.naming).to_string();
            b.use_entity(meta);
            b.write_delete_columns(&table)
        })
    }

    pub(super) fn write_delete_columns(&mut self, table: &str) -> SqlResult<()> {
        if self.head_written {
            return Err(SqlError::validation("DELETE already has a FROM clause"));
        }
        let columns: Vec<String> = match self.source.take() {
            Some(ColumnSource::Names(names)) => names.iter().map(|p| self.column(p)).collect(),
            Some(_) => return Err(SqlError::validation("only column names are valid for DELETE")),
            None => Vec::new(),
        };

        let (buf, _, _) = self.parts()?;
        buf.push_str("DELETE ");
        if !columns.is_empty() {
            buf.push_str(&columns.join(", "));
            buf.push(' ');
        }
        buf.push_str("FROM ");
        buf.push_str(table);
        self.head_written = true;
        Ok(())
    }
}
