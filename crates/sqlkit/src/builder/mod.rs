//! Fluent statement builder.
//!
//! A [`StatementBuilder`] writes one INSERT, SELECT, UPDATE or DELETE
//! statement into a pooled buffer. Chained calls consume and return the
//! builder; `sql()` or `build()` finalize it.
//!
//! ## Design
//!
//! - The first operation call (`insert`, `select`, `update`, `delete*`)
//!   fixes the statement kind; later calls are validated against it.
//! - The first usage error is kept. Later chained calls become no-ops and
//!   finalize returns the error.
//! - UPDATE requires SET.
//! - Finalize releases the pooled buffer and closes the builder; calling it
//!   again returns [`SqlError::Closed`].

mod clause;
mod delete;
mod insert;
mod select;
mod update;

use crate::binding::{BindingPolicy, ParamList};
use crate::error::{SqlError, SqlResult};
use crate::expr;
use crate::metadata::EntityMetadata;
use crate::naming::NamingPolicy;
use crate::pool::{BufferPool, PooledBuffer};
use crate::render::{self, RenderCtx};
use crate::statement::ParamStatement;
use crate::value::Props;
use std::fmt;
use std::sync::Arc;

/// Kind of statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Select,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Insert => "INSERT",
            OperationKind::Select => "SELECT",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns staged by an operation call, written once the table is known.
#[derive(Debug, Clone)]
enum ColumnSource {
    Names(Vec<String>),
    /// `(prop, alias)` pairs.
    Aliases(Vec<(String, String)>),
    Props(Props),
    PropsList(Vec<Props>),
}

/// Stateful statement builder bound to one naming and one binding policy.
#[derive(Debug)]
pub struct StatementBuilder {
    naming: NamingPolicy,
    binding: BindingPolicy,
    buf: Option<PooledBuffer>,
    op: Option<OperationKind>,
    entity: Option<Arc<EntityMetadata>>,
    source: Option<ColumnSource>,
    params: ParamList,
    /// `INSERT INTO t (...)`, `SELECT ... FROM t`, `UPDATE t`, `DELETE FROM t`.
    head_written: bool,
    /// UPDATE columns staged by `update_entity` until a SET is written.
    pending_set: Option<Vec<String>>,
    set_written: bool,
    using_written: bool,
    /// A clause after the statement head (WHERE, IF, ORDER BY, ...) was written.
    clauses_started: bool,
    /// Buffer length right after the last WHERE / IF condition.
    where_end: Option<usize>,
    if_end: Option<usize>,
    error: Option<SqlError>,
    closed: bool,
}

impl StatementBuilder {
    /// Create a builder writing into the process-wide buffer pool.
    pub fn new(naming: NamingPolicy, binding: BindingPolicy) -> Self {
        Self::with_pool(naming, binding, BufferPool::global())
    }

    pub(crate) fn with_pool(
        naming: NamingPolicy,
        binding: BindingPolicy,
        pool: &'static BufferPool,
    ) -> Self {
        Self {
            naming,
            binding,
            buf: Some(pool.acquire()),
            op: None,
            entity: None,
            source: None,
            params: ParamList::new(),
            head_written: false,
            pending_set: None,
            set_written: false,
            using_written: false,
            clauses_started: false,
            where_end: None,
            if_end: None,
            error: None,
            closed: false,
        }
    }

    pub fn naming(&self) -> NamingPolicy {
        self.naming
    }

    pub fn binding(&self) -> BindingPolicy {
        self.binding
    }

    pub fn operation(&self) -> Option<OperationKind> {
        self.op
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The first usage error recorded, if any.
    pub fn error(&self) -> Option<&SqlError> {
        self.error.as_ref()
    }

    /// Finalize into statement text. Parameters are discarded.
    pub fn sql(&mut self) -> SqlResult<String> {
        self.finish().map(|(sql, _)| sql)
    }

    /// Finalize into statement text plus ordered parameters.
    pub fn build(&mut self) -> SqlResult<ParamStatement> {
        self.finish()
            .map(|(sql, params)| ParamStatement::new(sql, params.into_vec()))
    }

    fn finish(&mut self) -> SqlResult<(String, ParamList)> {
        if self.closed {
            return Err(SqlError::Closed);
        }
        let outcome = match self.error.take() {
            Some(err) => Err(err),
            None => self.flush("sql"),
        };
        self.closed = true;
        // Dropping the guard returns the buffer to the pool.
        let buf = self.buf.take();
        outcome?;

        let sql = buf.as_deref().map(String::clone).ok_or(SqlError::Closed)?;
        let params = std::mem::take(&mut self.params);
        tracing::trace!(
            operation = ?self.op,
            len = sql.len(),
            params = params.len(),
            "statement finalized"
        );
        Ok((sql, params))
    }

    /// Run one chained step unless the builder already failed or closed.
    fn step(mut self, f: impl FnOnce(&mut Self) -> SqlResult<()>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = if self.closed { Err(SqlError::Closed) } else { f(&mut self) };
        if let Err(err) = result {
            self.error = Some(err);
            self.buf = None;
        }
        self
    }

    /// Establish the statement kind.
    fn establish(&mut self, kind: OperationKind) -> SqlResult<()> {
        match self.op {
            None => {
                self.op = Some(kind);
                Ok(())
            }
            Some(actual) if actual == kind && self.source.is_some() && !self.head_written => {
                Err(SqlError::DuplicateColumnSource)
            }
            Some(actual) => Err(SqlError::OperationAlreadySet(actual)),
        }
    }

    fn stage(&mut self, kind: OperationKind, source: ColumnSource) -> SqlResult<()> {
        self.establish(kind)?;
        self.source = Some(source);
        Ok(())
    }

    /// Check that the established kind is one of `allowed`.
    fn expect_op(&self, method: &'static str, allowed: &[OperationKind]) -> SqlResult<OperationKind> {
        match self.op {
            None => Err(SqlError::NoOperation(method)),
            Some(actual) if allowed.contains(&actual) => Ok(actual),
            Some(actual) => Err(SqlError::WrongOperation { method, actual }),
        }
    }

    fn use_entity(&mut self, metadata: Arc<EntityMetadata>) {
        if self.entity.is_none() {
            self.entity = Some(metadata);
        }
    }

    /// Make sure the statement head and any pending SET are written.
    fn flush(&mut self, method: &'static str) -> SqlResult<()> {
        let kind = self.expect_op(method, &[
            OperationKind::Insert,
            OperationKind::Select,
            OperationKind::Update,
            OperationKind::Delete,
        ])?;
        if !self.head_written {
            return Err(SqlError::MissingTable(format!(
                "{kind} columns were given but no table"
            )));
        }
        if kind == OperationKind::Update && !self.set_written {
            match self.pending_set.take() {
                Some(props) if !props.is_empty() => self.write_set_names(&props)?,
                _ => return Err(SqlError::MissingSet),
            }
        }
        self.clauses_started = true;
        Ok(())
    }

    /// Split borrows: the buffer, the parameter list and a render context.
    fn parts(&mut self) -> SqlResult<(&mut String, &mut ParamList, RenderCtx<'_>)> {
        let overrides = match self.entity.as_deref() {
            Some(meta) => meta.column_overrides(),
            None => render::no_overrides(),
        };
        let ctx = RenderCtx {
            naming: self.naming,
            binding: self.binding,
            overrides,
        };
        let buf = self.buf.as_deref_mut().ok_or(SqlError::Closed)?;
        Ok((buf, &mut self.params, ctx))
    }

    fn buf_len(&self) -> usize {
        self.buf.as_deref().map_or(0, String::len)
    }

    fn push_str(&mut self, s: &str) -> SqlResult<()> {
        let (buf, _, _) = self.parts()?;
        buf.push_str(s);
        Ok(())
    }

    /// Resolve a property to its column name.
    fn column(&self, prop: &str) -> String {
        match self.entity.as_deref() {
            Some(meta) => meta.column_name(self.naming, prop),
            None => self.naming.convert(prop),
        }
    }

    /// Write `text` with identifiers resolved through the naming policy.
    fn push_formalized(&mut self, text: &str) -> SqlResult<()> {
        let (buf, _, ctx) = self.parts()?;
        expr::write_formalized(text, ctx.naming, ctx.overrides, buf);
        Ok(())
    }

    fn push_condition(&mut self, cond: &crate::condition::Condition) -> SqlResult<()> {
        let (buf, params, ctx) = self.parts()?;
        render::render(cond, &ctx, buf, params)
    }
}

fn collect_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Vec<String> {
    names.into_iter().map(|s| s.as_ref().to_string()).collect()
}

/// A column expression that is written verbatim and never aliased.
fn is_raw_column(col: &str) -> bool {
    col == "*" || col.ends_with(".*") || col.contains(|c: char| c.is_whitespace() || c == ',' || c == '(')
}

#[cfg(test)]
mod tests;
