//! Finalized statements and the executor hand-off.

use crate::binding::Param;
use crate::error::SqlResult;
use crate::value::Value;
use serde::Serialize;

/// Statement text plus its ordered parameters.
///
/// Immutable once built and safe to share across threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamStatement {
    sql: String,
    params: Vec<Param>,
}

impl ParamStatement {
    pub(crate) fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    /// Get the statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the parameters in placeholder order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter values without their names.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.sql, self.params)
    }

    /// Hand the statement to an executor.
    pub async fn execute_with<E: Executor>(&self, executor: &E) -> SqlResult<E::Output> {
        executor.execute(self).await
    }
}

/// A caller-supplied sink that runs statements against a data store.
///
/// The builder never executes anything itself; document, wide-column or
/// relational clients implement this trait on their side.
pub trait Executor: Send + Sync {
    /// What a successful execution yields (rows, affected count, ...).
    type Output;

    /// Execute one statement.
    fn execute(
        &self,
        statement: &ParamStatement,
    ) -> impl std::future::Future<Output = SqlResult<Self::Output>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParamStatement>();
    }

    #[test]
    fn serializes_to_json() {
        let stmt = ParamStatement::new(
            "SELECT name FROM account WHERE id = ?".into(),
            vec![Param::positional(Value::Int(7))],
        );
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["sql"], "SELECT name FROM account WHERE id = ?");
        assert_eq!(json["params"][0]["value"]["Int"], 7);
        assert_eq!(stmt.values().collect::<Vec<_>>(), vec![&Value::Int(7)]);
    }
}
