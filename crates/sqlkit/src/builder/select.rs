//! SELECT statements, FROM and the SELECT-only clauses.

use super::{ColumnSource, OperationKind, StatementBuilder, collect_names, is_raw_column};
use crate::condition::Condition;
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::metadata::{EntityMetadata, PropertyCategory};
use crate::naming::NamingPolicy;

impl StatementBuilder {
    /// Select properties by name.
    ///
    /// Each column is written as `col AS "prop"` when the column differs from
    /// the property, unless the naming policy is `LowerCamel` or the entry is
    /// a raw expression (`*`, or containing whitespace, `,` or `(`).
    pub fn select<S: AsRef<str>>(self, props: impl IntoIterator<Item = S>) -> Self {
        let names = collect_names(props);
        self.step(|b| b.stage(OperationKind::Select, ColumnSource::Names(names)))
    }

    /// Select `(prop, alias)` pairs, each written as `col AS "alias"`.
    pub fn select_aliases<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        self.step(|b| b.stage(OperationKind::Select, ColumnSource::Aliases(pairs)))
    }

    /// Select the selectable properties of `T`.
    pub fn select_entity<T: Entity>(self) -> Self {
        self.select_entity_excluding::<T>(&[])
    }

    pub fn select_entity_excluding<T: Entity>(self, excluded: &[&str]) -> Self {
        self.step(|b| {
            let meta = EntityMetadata::of::<T>();
            let names = meta.properties_excluding(PropertyCategory::Selectable, excluded);
            b.stage(OperationKind::Select, ColumnSource::Names(names))?;
            b.use_entity(meta);
            Ok(())
        })
    }

    /// Write `SELECT <cols> FROM <table>` (or `DELETE <cols> FROM <table>`).
    pub fn from(self, table: &str) -> Self {
        let table = table.to_string();
        self.step(move |b| b.write_from(&table))
    }

    /// FROM several tables, comma-joined.
    pub fn from_tables<S: AsRef<str>>(self, tables: impl IntoIterator<Item = S>) -> Self {
        let tables = collect_names(tables).join(", ");
        self.step(move |b| {
            if tables.is_empty() {
                return Err(SqlError::MissingTable("FROM has no tables".into()));
            }
            b.write_from(&tables)
        })
    }

    /// FROM the table of `T`; its column overrides apply to later clauses.
    pub fn from_entity<T: Entity>(self) -> Self {
        self.step(|b| {
            let meta = EntityMetadata::of::<T>();
            let table = meta.table_name(b.naming).to_string();
            b.use_entity(meta);
            b.write_from(&table)
        })
    }

    fn write_from(&mut self, table: &str) -> SqlResult<()> {
        match self.expect_op("from", &[OperationKind::Select, OperationKind::Delete])? {
            OperationKind::Delete => self.write_delete_columns(table),
            _ => self.write_select(table),
        }
    }

    fn write_select(&mut self, table: &str) -> SqlResult<()> {
        if self.head_written {
            return Err(SqlError::validation("SELECT already has a FROM clause"));
        }
        let columns = match self.source.take() {
            Some(ColumnSource::Names(names)) => names
                .iter()
                .map(|prop| self.select_column(prop, None))
                .collect::<Vec<_>>(),
            Some(ColumnSource::Aliases(pairs)) => pairs
                .iter()
                .map(|(prop, alias)| self.select_column(prop, Some(alias.as_str())))
                .collect(),
            Some(_) => return Err(SqlError::validation("property maps are not valid for SELECT")),
            None => Vec::new(),
        };
        if columns.is_empty() {
            return Err(SqlError::MissingColumns(format!("SELECT FROM {table} has no columns")));
        }

        let (buf, _, _) = self.parts()?;
        buf.push_str("SELECT ");
        buf.push_str(&columns.join(", "));
        buf.push_str(" FROM ");
        buf.push_str(table);
        self.head_written = true;
        Ok(())
    }

    fn select_column(&self, prop: &str, alias: Option<&str>) -> String {
        if is_raw_column(prop) {
            return match alias {
                Some(alias) => format!("{prop} AS \"{alias}\""),
                None => prop.to_string(),
            };
        }
        let column = self.column(prop);
        match alias {
            Some(alias) => format!("{column} AS \"{alias}\""),
            None if self.naming != NamingPolicy::LowerCamel && column != prop => {
                format!("{column} AS \"{prop}\"")
            }
            None => column,
        }
    }

    /// `JOIN <table> ON <on>`.
    pub fn join(self, table: &str, on: &str) -> Self {
        self.push_join("JOIN", table, on)
    }

    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.push_join("INNER JOIN", table, on)
    }

    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.push_join("LEFT JOIN", table, on)
    }

    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.push_join("RIGHT JOIN", table, on)
    }

    pub fn full_join(self, table: &str, on: &str) -> Self {
        self.push_join("FULL OUTER JOIN", table, on)
    }

    fn push_join(self, keyword: &'static str, table: &str, on: &str) -> Self {
        self.step(|b| {
            b.expect_op("join", &[OperationKind::Select])?;
            b.flush("join")?;
            b.push_str(" ")?;
            b.push_str(keyword)?;
            b.push_str(" ")?;
            b.push_str(table)?;
            b.push_str(" ON ")?;
            b.push_formalized(on)
        })
    }

    /// `GROUP BY <expr>`; identifiers are resolved through the naming policy.
    pub fn group_by(self, expr: &str) -> Self {
        self.step(|b| {
            b.expect_op("group_by", &[OperationKind::Select])?;
            b.flush("group_by")?;
            b.push_str(" GROUP BY ")?;
            b.push_formalized(expr)
        })
    }

    pub fn having(self, cond: Condition) -> Self {
        self.step(|b| {
            b.expect_op("having", &[OperationKind::Select])?;
            b.flush("having")?;
            b.push_str(" HAVING ")?;
            b.push_condition(&cond)
        })
    }

    pub fn having_expr(self, expr: &str) -> Self {
        self.step(|b| {
            b.expect_op("having", &[OperationKind::Select])?;
            b.flush("having")?;
            b.push_str(" HAVING ")?;
            b.push_formalized(expr)
        })
    }

    pub fn offset(self, offset: u64) -> Self {
        self.step(|b| {
            b.expect_op("offset", &[OperationKind::Select])?;
            b.flush("offset")?;
            b.push_str(&format!(" OFFSET {offset}"))
        })
    }

    /// `LIMIT per_page OFFSET (page - 1) * per_page`; pages start at 1.
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    pub fn for_update(self) -> Self {
        self.step(|b| {
            b.expect_op("for_update", &[OperationKind::Select])?;
            b.flush("for_update")?;
            b.push_str(" FOR UPDATE")
        })
    }

    /// CQL `ALLOW FILTERING`.
    pub fn allow_filtering(self) -> Self {
        self.step(|b| {
            b.expect_op("allow_filtering", &[OperationKind::Select])?;
            b.flush("allow_filtering")?;
            b.push_str(" ALLOW FILTERING")
        })
    }
}
