//! INSERT statements.

use super::{ColumnSource, OperationKind, StatementBuilder, collect_names};
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::metadata::{EntityMetadata, PropertyCategory};
use crate::render;
use crate::value::{Props, Value};

impl StatementBuilder {
    /// `INSERT INTO <table> (<cols>) VALUES (<placeholders>)`.
    pub fn insert<S: AsRef<str>>(self, props: impl IntoIterator<Item = S>) -> Self {
        let names = collect_names(props);
        self.step(|b| b.stage(OperationKind::Insert, ColumnSource::Names(names)))
    }

    /// Insert one row from an ordered property map.
    pub fn insert_map(self, props: Props) -> Self {
        self.step(|b| b.stage(OperationKind::Insert, ColumnSource::Props(props)))
    }

    /// Insert several rows in one statement. Columns are the union of all
    /// keys in first-seen order; a key missing from a row is written as null.
    pub fn insert_maps(self, rows: impl IntoIterator<Item = Props>) -> Self {
        let rows: Vec<Props> = rows.into_iter().collect();
        self.step(|b| b.stage(OperationKind::Insert, ColumnSource::PropsList(rows)))
    }

    /// Insert the insertable properties of `entity`.
    pub fn insert_entity<T: Entity>(self, entity: &T) -> Self {
        self.insert_entity_excluding(entity, &[])
    }

    /// Insert the insertable properties of `entity` except `excluded`.
    pub fn insert_entity_excluding<T: Entity>(self, entity: &T, excluded: &[&str]) -> Self {
        self.step(|b| {
            let meta = EntityMetadata::of::<T>();
            let props: Props = meta
                .properties_excluding(PropertyCategory::Insertable, excluded)
                .into_iter()
                .map(|prop| {
                    let value = entity.value_of(&prop).unwrap_or(Value::Null);
                    (prop, value)
                })
                .collect();
            b.stage(OperationKind::Insert, ColumnSource::Props(props))?;
            b.use_entity(meta);
            Ok(())
        })
    }

    /// Stage the insertable property names of `T` with placeholders.
    pub fn insert_entity_type<T: Entity>(self) -> Self {
        self.insert_entity_type_excluding::<T>(&[])
    }

    pub fn insert_entity_type_excluding<T: Entity>(self, excluded: &[&str]) -> Self {
        self.step(|b| {
            let meta = EntityMetadata::of::<T>();
            let names = meta.properties_excluding(PropertyCategory::Insertable, excluded);
            b.stage(OperationKind::Insert, ColumnSource::Names(names))?;
            b.use_entity(meta);
            Ok(())
        })
    }

    /// Write the INSERT head into `table`.
    pub fn into(self, table: &str) -> Self {
        let table = table.to_string();
        self.step(move |b| b.write_insert(&table))
    }

    /// Write the INSERT head into the table of `T`.
    pub fn into_entity<T: Entity>(self) -> Self {
        self.step(|b| {
            let meta = EntityMetadata::of::<T>();
            let table = meta.table_name(b.naming).to_string();
            b.use_entity(meta);
            b.write_insert(&table)
        })
    }

    fn write_insert(&mut self, table: &str) -> SqlResult<()> {
        self.expect_op("into", &[OperationKind::Insert])?;
        if self.head_written {
            return Err(SqlError::validation("INSERT target table already written"));
        }
        let source = self
            .source
            .take()
            .ok_or_else(|| SqlError::MissingColumns("INSERT has no columns".into()))?;

        let (columns, rows): (Vec<String>, Vec<Vec<Value>>) = match source {
            ColumnSource::Names(names) => {
                let rows = vec![vec![Value::Placeholder; names.len()]];
                (names, rows)
            }
            ColumnSource::Props(props) => {
                let (columns, values) = props.into_iter().unzip();
                (columns, vec![values])
            }
            ColumnSource::PropsList(list) => {
                let mut columns: Vec<String> = Vec::new();
                for row in &list {
                    for key in row.keys() {
                        if !columns.iter().any(|c| c == key) {
                            columns.push(key.to_string());
                        }
                    }
                }
                let rows = list
                    .iter()
                    .map(|row| {
                        columns
                            .iter()
                            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                            .collect()
                    })
                    .collect();
                (columns, rows)
            }
            ColumnSource::Aliases(_) => {
                return Err(SqlError::validation("aliases are not valid for INSERT"));
            }
        };
        if columns.is_empty() || rows.is_empty() {
            return Err(SqlError::MissingColumns(format!("INSERT INTO {table} has no columns")));
        }

        let column_names: Vec<String> = columns.iter().map(|p| self.column(p)).collect();
        let (buf, params, ctx) = self.parts()?;
        buf.push_str("INSERT INTO ");
        buf.push_str(table);
        buf.push_str(" (");
        buf.push_str(&column_names.join(", "));
        buf.push_str(") VALUES ");
        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                buf.push_str(", ");
            }
            buf.push('(');
            for (i, (prop, value)) in columns.iter().zip(row).enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                render::write_value(value, prop, &ctx, buf, params)?;
            }
            buf.push(')');
        }
        self.head_written = true;
        Ok(())
    }
}
