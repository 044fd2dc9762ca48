//! Clauses shared by several statement kinds: WHERE, IF, ORDER BY, LIMIT,
//! USING and raw text.

use super::{OperationKind, StatementBuilder};
use crate::condition::Condition;
use crate::error::{SqlError, SqlResult};

const FILTERED: &[OperationKind] = &[
    OperationKind::Select,
    OperationKind::Update,
    OperationKind::Delete,
];

const CONDITIONAL: &[OperationKind] = &[
    OperationKind::Insert,
    OperationKind::Update,
    OperationKind::Delete,
];

impl StatementBuilder {
    /// `WHERE <cond>`. A second call directly after the first is joined
    /// with `AND`.
    pub fn where_(self, cond: Condition) -> Self {
        self.step(|b| {
            b.open_where()?;
            b.push_condition(&cond)?;
            b.where_end = Some(b.buf_len());
            Ok(())
        })
    }

    /// `WHERE <expr>`; identifiers are resolved through the naming policy.
    pub fn where_expr(self, expr: &str) -> Self {
        self.step(|b| {
            b.open_where()?;
            b.push_formalized(expr)?;
            b.where_end = Some(b.buf_len());
            Ok(())
        })
    }

    fn open_where(&mut self) -> SqlResult<()> {
        self.expect_op("where", FILTERED)?;
        self.flush("where")?;
        let keyword = continuation(self.where_end, self.buf_len(), " WHERE ")?;
        self.push_str(keyword)
    }

    /// CQL lightweight transaction condition: `IF <cond>`.
    pub fn if_(self, cond: Condition) -> Self {
        self.step(|b| {
            b.open_if()?;
            b.push_condition(&cond)?;
            b.if_end = Some(b.buf_len());
            Ok(())
        })
    }

    pub fn if_expr(self, expr: &str) -> Self {
        self.step(|b| {
            b.open_if()?;
            b.push_formalized(expr)?;
            b.if_end = Some(b.buf_len());
            Ok(())
        })
    }

    fn open_if(&mut self) -> SqlResult<()> {
        self.expect_op("if", CONDITIONAL)?;
        self.flush("if")?;
        let keyword = continuation(self.if_end, self.buf_len(), " IF ")?;
        self.push_str(keyword)
    }

    /// `IF EXISTS`
    pub fn if_exists(self) -> Self {
        self.step(|b| {
            b.expect_op("if_exists", CONDITIONAL)?;
            b.flush("if_exists")?;
            b.push_str(" IF EXISTS")
        })
    }

    /// `IF NOT EXISTS`
    pub fn if_not_exists(self) -> Self {
        self.step(|b| {
            b.expect_op("if_not_exists", CONDITIONAL)?;
            b.flush("if_not_exists")?;
            b.push_str(" IF NOT EXISTS")
        })
    }

    /// `ORDER BY <expr>`, e.g. `"lastName DESC, firstName"`.
    pub fn order_by(self, expr: &str) -> Self {
        self.step(|b| {
            b.expect_op("order_by", FILTERED)?;
            b.flush("order_by")?;
            b.push_str(" ORDER BY ")?;
            b.push_formalized(expr)
        })
    }

    pub fn limit(self, limit: u64) -> Self {
        self.step(|b| {
            b.expect_op("limit", FILTERED)?;
            b.flush("limit")?;
            b.push_str(&format!(" LIMIT {limit}"))
        })
    }

    /// CQL `USING TTL <seconds>`.
    pub fn using_ttl(self, seconds: u64) -> Self {
        self.step(|b| b.push_using(&format!("TTL {seconds}")))
    }

    /// CQL `USING TIMESTAMP <micros>`.
    pub fn using_timestamp(self, timestamp: i64) -> Self {
        self.step(|b| b.push_using(&format!("TIMESTAMP {timestamp}")))
    }

    // USING sits between the head and SET, so it never flushes a pending SET.
    fn push_using(&mut self, item: &str) -> SqlResult<()> {
        let kind = self.expect_op("using", CONDITIONAL)?;
        if !self.head_written {
            return Err(SqlError::MissingTable(format!("{kind} USING before table")));
        }
        let keyword = if self.using_written { " AND " } else { " USING " };
        self.using_written = true;
        self.push_str(keyword)?;
        self.push_str(item)
    }

    /// Append raw text after a single space. The text is not resolved.
    pub fn append(self, raw: &str) -> Self {
        self.step(|b| {
            b.flush("append")?;
            b.push_str(" ")?;
            b.push_str(raw.trim_start())
        })
    }
}

/// Keyword opening a WHERE / IF condition. A repeated condition extends the
/// previous one only if nothing was written since.
fn continuation(end: Option<usize>, len: usize, open: &'static str) -> SqlResult<&'static str> {
    match end {
        None => Ok(open),
        Some(end) if end == len => Ok(" AND "),
        Some(_) => {
            let clause = open.trim();
            Err(SqlError::validation(format!(
                "{clause} must directly follow the previous {clause} condition"
            )))
        }
    }
}
