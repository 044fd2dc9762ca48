use super::*;
use crate::condition::{Condition, Operator};
use crate::entity::{ChangeTracker, Entity, EntityDescriptor, FieldDescriptor as F, FieldKind};
use crate::pool::PoolConfig;
use crate::value::Value;
use crate::variant::*;

static ACCOUNT: EntityDescriptor = EntityDescriptor {
    name: "Account",
    table: None,
    fields: &[
        F::new("id", FieldKind::Long),
        F::new("firstName", FieldKind::String),
        F::new("lastName", FieldKind::String).column("surname"),
        F::new("email", FieldKind::String).non_updatable(),
        F::new("createdAt", FieldKind::Timestamp).read_only(),
        F::new("score", FieldKind::Int).transient(),
    ],
    parent: None,
};

struct Account {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    changes: Option<ChangeTracker>,
}

impl Account {
    fn sample() -> Self {
        Self {
            id: 7,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            changes: None,
        }
    }
}

impl Entity for Account {
    fn descriptor() -> &'static EntityDescriptor {
        &ACCOUNT
    }

    fn value_of(&self, prop: &str) -> Option<Value> {
        match prop {
            "id" => Some(self.id.into()),
            "firstName" => Some(self.first_name.clone().into()),
            "lastName" => Some(self.last_name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "createdAt" => Some(Value::Null),
            _ => None,
        }
    }

    fn changed_properties(&self) -> Option<Vec<String>> {
        self.changes.as_ref().map(ChangeTracker::changed)
    }
}

fn leaked_pool() -> &'static BufferPool {
    Box::leak(Box::new(BufferPool::new(PoolConfig::new())))
}

// ==================== End-to-end ====================

#[test]
fn test_insert_names_positional() {
    let stmt = SnakePositional::insert(["firstName", "lastName"])
        .into("account")
        .build()
        .unwrap();
    assert_eq!(stmt.sql(), "INSERT INTO account (first_name, last_name) VALUES (?, ?)");
    assert!(stmt.params().is_empty());
}

#[test]
fn test_select_with_aliases_inline() {
    let sql = SnakeInline::select(["firstName", "lastName"])
        .from("account")
        .where_(Condition::eq("id", 1))
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT first_name AS "firstName", last_name AS "lastName" FROM account WHERE id = 1"#
    );
}

#[test]
fn test_update_with_raw_where() {
    let stmt = SnakePositional::update("account")
        .set(["firstName"])
        .where_expr("id > 0")
        .build()
        .unwrap();
    assert_eq!(stmt.sql(), "UPDATE account SET first_name = ? WHERE id > 0");
    assert!(stmt.params().is_empty());
}

#[test]
fn test_between_named() {
    let stmt = SnakeNamed::select(["*"])
        .from("person")
        .where_(Condition::between("age", 18, 65))
        .build()
        .unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM person WHERE age BETWEEN :minAge AND :maxAge");
    let names: Vec<_> = stmt.params().iter().map(|p| p.name.as_deref()).collect();
    assert_eq!(names, vec![Some("minAge"), Some("maxAge")]);
}

#[test]
fn test_and_junction() {
    let sql = SnakeInline::select(["a"])
        .from("t")
        .where_(Condition::and(vec![
            Condition::eq("a", 1),
            Condition::eq("b", 2),
            Condition::eq("c", 3),
        ]))
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE (a = 1) AND (b = 2) AND (c = 3)");
}

// ==================== SELECT ====================

#[test]
fn test_select_raw_columns_are_not_aliased() {
    let sql = SnakeInline::select(["COUNT(*)", "*", "acc.*", "acc.firstName", "id"])
        .from("account acc")
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT COUNT(*), *, acc.*, acc.first_name AS "acc.firstName", id FROM account acc"#
    );
}

#[test]
fn test_lower_camel_never_aliases() {
    let sql = CamelInline::select(["firstName", "lastName"])
        .from("account")
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT firstName, lastName FROM account");
}

#[test]
fn test_select_explicit_aliases() {
    let sql = UpperInline::select_aliases([("firstName", "name"), ("id", "key")])
        .from("ACCOUNT")
        .sql()
        .unwrap();
    assert_eq!(sql, r#"SELECT FIRST_NAME AS "name", ID AS "key" FROM ACCOUNT"#);
}

#[test]
fn test_select_multiple_tables() {
    let sql = SnakeInline::select(["a.id", "b.id"])
        .from_tables(["a", "b"])
        .where_expr("a.bId = b.id")
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT a.id, b.id FROM a, b WHERE a.b_id = b.id");
}

#[test]
fn test_select_full_clause_chain() {
    let sql = SnakeInline::select(["acc.firstName", "o.totalAmount"])
        .from("account acc")
        .left_join("orders o", "o.accountId = acc.id")
        .where_(Condition::gt("o.totalAmount", 10))
        .group_by("acc.firstName")
        .having_expr("COUNT(*) > 1")
        .order_by("acc.firstName DESC")
        .limit(5)
        .offset(10)
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT acc.first_name AS "acc.firstName", o.total_amount AS "o.totalAmount" FROM account acc LEFT JOIN orders o ON o.account_id = acc.id WHERE o.total_amount > 10 GROUP BY acc.first_name HAVING COUNT(*) > 1 ORDER BY acc.first_name DESC LIMIT 5 OFFSET 10"#
    );
}

#[test]
fn test_paginate_and_for_update() {
    let sql = SnakePositional::select(["id"])
        .from("job")
        .paginate(3, 20)
        .for_update()
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT id FROM job LIMIT 20 OFFSET 40 FOR UPDATE");
}

#[test]
fn test_having_condition_binds_params() {
    let stmt = SnakePositional::select(["status", "COUNT(*)"])
        .from("job")
        .group_by("status")
        .having(Condition::gt("COUNT(*)", 3))
        .build()
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT status, COUNT(*) FROM job GROUP BY status HAVING COUNT(*) > ?"
    );
    assert_eq!(stmt.params().len(), 1);
}

#[test]
fn test_second_where_is_joined_with_and() {
    let sql = SnakeInline::select(["id"])
        .from("t")
        .where_(Condition::eq("a", 1))
        .where_expr("b IS NOT NULL")
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT id FROM t WHERE a = 1 AND b IS NOT NULL");
}

#[test]
fn test_where_after_another_clause_fails() {
    let mut builder = SnakeInline::select(["id"])
        .from("t")
        .where_(Condition::eq("a", 1))
        .order_by("b")
        .where_(Condition::eq("c", 2));
    assert!(matches!(builder.error(), Some(SqlError::Validation(_))));
    assert!(matches!(builder.sql().unwrap_err(), SqlError::Validation(_)));
}

#[test]
fn test_if_after_another_clause_fails() {
    let err = SnakeInline::update("t")
        .set(["a"])
        .if_(Condition::eq("a", 0))
        .append("-- note")
        .if_expr("b = 1")
        .sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));

    let sql = SnakeInline::update("t")
        .set(["a"])
        .if_(Condition::eq("a", 0))
        .if_expr("b = 1")
        .sql()
        .unwrap();
    assert_eq!(sql, "UPDATE t SET a = ? IF a = 0 AND b = 1");
}

#[test]
fn test_sub_query_in_where() {
    let stmt = SnakePositional::select(["id"])
        .from("orders")
        .where_(Condition::binary(
            "accountId",
            Operator::In,
            Condition::sub_query("account", ["id"], Condition::eq("status", "active")),
        ))
        .build()
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT id FROM orders WHERE account_id IN (SELECT id FROM account WHERE status = ?)"
    );
    assert_eq!(stmt.params().len(), 1);
}

#[test]
fn test_placeholder_count_matches_params() {
    let stmt = SnakePositional::select(["id"])
        .from("t")
        .where_(Condition::and(vec![
            Condition::eq("a", 1),
            Condition::or(vec![Condition::lt("b", 2), Condition::between("c", 3, 4)]),
            Condition::in_list("d", ["x", "y", "z"]),
            Condition::not(Condition::like("e", "%q%")),
        ]))
        .build()
        .unwrap();
    assert_eq!(stmt.sql().matches('?').count(), stmt.params().len());
    assert_eq!(stmt.params().len(), 8);
}

#[test]
fn test_allow_filtering() {
    let sql = SnakeInline::select(["a"])
        .from("t")
        .where_(Condition::eq("b", 1))
        .allow_filtering()
        .sql()
        .unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE b = 1 ALLOW FILTERING");
}

// ==================== INSERT ====================

#[test]
fn test_insert_map_named() {
    let stmt = SnakeNamed::insert_map(Props::new().set("firstName", "Ada").set("age", 36))
        .into("person")
        .build()
        .unwrap();
    assert_eq!(stmt.sql(), "INSERT INTO person (first_name, age) VALUES (:firstName, :age)");
    assert_eq!(stmt.params()[0].value, Value::Text("Ada".into()));
}

#[test]
fn test_insert_map_inline_literals() {
    let sql = UpperInline::insert_map(Props::new().set("lastName", "O'Neil").set("active", true))
        .into("PERSON")
        .sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO PERSON (LAST_NAME, ACTIVE) VALUES ('O''Neil', true)");
}

#[test]
fn test_bulk_insert_fills_missing_keys_with_null() {
    let stmt = SnakeNamed::insert_maps([
        Props::new().set("a", 1).set("b", 2),
        Props::new().set("a", 3),
    ])
    .into("t")
    .build()
    .unwrap();
    assert_eq!(stmt.sql(), "INSERT INTO t (a, b) VALUES (:a, :b), (:a, :b)");
    let values: Vec<_> = stmt.values().cloned().collect();
    assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Null]);
}

#[test]
fn test_insert_cql_options() {
    let sql = SnakeInline::insert(["id"])
        .into("event")
        .if_not_exists()
        .using_ttl(10)
        .using_timestamp(5)
        .sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO event (id) VALUES (?) IF NOT EXISTS USING TTL 10 AND TIMESTAMP 5");
}

#[test]
fn test_insert_without_table_fails() {
    let err = SnakeInline::insert(["id"]).sql().unwrap_err();
    assert!(matches!(err, SqlError::MissingTable(_)));
}

// ==================== UPDATE ====================

#[test]
fn test_multiple_set_calls_share_one_clause() {
    let stmt = SnakePositional::update("t")
        .set(["a"])
        .set_map(Props::new().set("b", 2).set("updatedAt", Value::expr("NOW()")))
        .build()
        .unwrap();
    assert_eq!(stmt.sql(), "UPDATE t SET a = ?, b = ?, updated_at = NOW()");
    assert_eq!(stmt.params().len(), 1);
}

#[test]
fn test_update_using_before_set() {
    let sql = SnakeInline::update("t")
        .using_ttl(60)
        .set_map(Props::new().set("a", 1))
        .where_(Condition::eq("id", 1))
        .if_(Condition::eq("a", 0))
        .sql()
        .unwrap();
    assert_eq!(sql, "UPDATE t USING TTL 60 SET a = 1 WHERE id = 1 IF a = 0");
}

#[test]
fn test_update_without_set_fails() {
    let err = SnakeInline::update("t").where_expr("id = 1").sql().unwrap_err();
    assert_eq!(err, SqlError::MissingSet);

    let err = SnakeInline::update("t").sql().unwrap_err();
    assert_eq!(err, SqlError::MissingSet);
}

#[test]
fn test_set_after_where_fails() {
    let err = SnakeInline::update("t")
        .set(["a"])
        .where_expr("id = 1")
        .set(["b"])
        .sql()
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
}

// ==================== DELETE ====================

#[test]
fn test_delete_from_with_cql_clauses() {
    let sql = SnakeInline::delete_from("event")
        .using_timestamp(1_700_000_000)
        .where_(Condition::eq("id", 42))
        .if_exists()
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        "DELETE FROM event USING TIMESTAMP 1700000000 WHERE id = 42 IF EXISTS"
    );
}

#[test]
fn test_delete_columns() {
    let sql = SnakeInline::delete(["emailAddress", "phone"])
        .from("account")
        .where_(Condition::eq("id", 1))
        .sql()
        .unwrap();
    assert_eq!(sql, "DELETE email_address, phone FROM account WHERE id = 1");
}

#[test]
fn test_append_raw_text() {
    let sql = SnakeInline::delete_from("t")
        .where_(Condition::lt("id", 10))
        .append("RETURNING id")
        .sql()
        .unwrap();
    assert_eq!(sql, "DELETE FROM t WHERE id < 10 RETURNING id");
}

// ==================== Entities ====================

#[test]
fn test_insert_entity_uses_insertable_and_overrides() {
    let stmt = SnakePositional::insert_entity(&Account::sample())
        .into_entity::<Account>()
        .build()
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO account (id, first_name, surname, email) VALUES (?, ?, ?, ?)"
    );
    assert_eq!(stmt.params()[2].value, Value::Text("Doe".into()));
}

#[test]
fn test_insert_entity_excluding() {
    let sql = SnakeInline::builder()
        .insert_entity_excluding(&Account::sample(), &["id", "email"])
        .into("account")
        .sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO account (first_name, surname) VALUES ('Jane', 'Doe')");
}

#[test]
fn test_insert_into_entity_type() {
    let sql = SnakeNamed::insert_into::<Account>().sql().unwrap();
    assert_eq!(
        sql,
        "INSERT INTO account (id, first_name, surname, email) VALUES (:id, :firstName, :lastName, :email)"
    );
}

#[test]
fn test_select_from_entity() {
    let sql = UpperInline::select_from::<Account>()
        .where_(Condition::eq("lastName", "Doe"))
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT ID AS "id", FIRST_NAME AS "firstName", surname AS "lastName", EMAIL AS "email", CREATED_AT AS "createdAt" FROM ACCOUNT WHERE surname = 'Doe'"#
    );
}

#[test]
fn test_select_entity_excluding() {
    let sql = SnakeInline::builder()
        .select_entity_excluding::<Account>(&["email", "createdAt"])
        .from_entity::<Account>()
        .sql()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT id, first_name AS "firstName", surname AS "lastName" FROM account"#
    );
}

#[test]
fn test_update_entity_writes_staged_set() {
    let stmt = SnakePositional::update_entity::<Account>()
        .where_(Condition::eq("id", Value::Placeholder))
        .build()
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE account SET id = ?, first_name = ?, surname = ? WHERE id = ?"
    );
    assert!(stmt.params().is_empty());
}

#[test]
fn test_set_entity_only_changed_properties() {
    let mut account = Account::sample();
    let mut tracker = ChangeTracker::new();
    tracker.mark("lastName");
    tracker.mark("email");
    account.changes = Some(tracker);

    let stmt = SnakeNamed::update_entity::<Account>()
        .set_entity(&account)
        .where_(Condition::eq("id", 7))
        .build()
        .unwrap();
    // `email` is not updatable.
    assert_eq!(stmt.sql(), "UPDATE account SET surname = :lastName WHERE id = :id");
    assert_eq!(stmt.params().len(), 2);
}

#[test]
fn test_set_entity_with_no_changes_fails() {
    let mut account = Account::sample();
    account.changes = Some(ChangeTracker::new());
    let err = SnakeNamed::update("account")
        .set_entity(&account)
        .sql()
        .unwrap_err();
    assert_eq!(err, SqlError::MissingSet);
}

#[test]
fn test_delete_from_entity() {
    let sql = SnakeInline::delete_from_entity::<Account>()
        .where_(Condition::eq("lastName", "Doe"))
        .sql()
        .unwrap();
    assert_eq!(sql, "DELETE FROM account WHERE surname = 'Doe'");
}

// ==================== Usage errors ====================

#[test]
fn test_call_before_operation() {
    let err = StatementBuilder::new(NamingPolicy::LowerSnake, BindingPolicy::InlineLiteral)
        .from("t")
        .sql()
        .unwrap_err();
    assert_eq!(err, SqlError::NoOperation("from"));
}

#[test]
fn test_wrong_operation() {
    let err = SnakeInline::insert(["a"])
        .into("t")
        .where_(Condition::eq("a", 1))
        .sql()
        .unwrap_err();
    assert_eq!(
        err,
        SqlError::WrongOperation {
            method: "where",
            actual: OperationKind::Insert,
        }
    );
}

#[test]
fn test_second_column_source() {
    let err = SnakeInline::select(["a"]).select(["b"]).sql().unwrap_err();
    assert_eq!(err, SqlError::DuplicateColumnSource);
}

#[test]
fn test_second_operation() {
    let err = SnakeInline::select(["a"])
        .from("t")
        .update("t")
        .sql()
        .unwrap_err();
    assert_eq!(err, SqlError::OperationAlreadySet(OperationKind::Select));
}

#[test]
fn test_first_error_is_kept() {
    let builder = SnakeInline::select(["a"])
        .where_(Condition::eq("a", 1))
        .from("t")
        .limit(1);
    assert!(matches!(builder.error(), Some(SqlError::MissingTable(_))));
}

#[test]
fn test_empty_junction_error() {
    let err = SnakeInline::select(["a"])
        .from("t")
        .where_(Condition::or(vec![]))
        .sql()
        .unwrap_err();
    assert_eq!(err, SqlError::EmptyJunction(Operator::Or));
}

#[test]
fn test_finalize_twice() {
    let mut builder = SnakeInline::select(["a"]).from("t");
    assert!(builder.sql().is_ok());
    assert!(builder.is_closed());
    assert_eq!(builder.sql().unwrap_err(), SqlError::Closed);
    assert!(builder.build().unwrap_err().is_closed());
}

#[test]
fn test_call_after_finalize() {
    let mut builder = SnakeInline::select(["a"]).from("t");
    builder.sql().unwrap();
    let builder = builder.where_(Condition::eq("a", 1));
    assert_eq!(builder.error(), Some(&SqlError::Closed));
}

// ==================== Pool lifecycle ====================

#[test]
fn test_buffer_released_after_finalize() {
    let pool = leaked_pool();
    let mut builder = StatementBuilder::with_pool(
        NamingPolicy::LowerSnake,
        BindingPolicy::PositionalPlaceholder,
        pool,
    )
    .select(["a"])
    .from("t");
    assert_eq!(pool.active_count(), 1);
    builder.sql().unwrap();
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.idle_count(), 1);

    // A second finalize does not release again.
    assert!(builder.sql().is_err());
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.idle_count(), 1);
}

#[test]
fn test_buffer_released_on_error_and_drop() {
    let pool = leaked_pool();
    let mut failed =
        StatementBuilder::with_pool(NamingPolicy::LowerSnake, BindingPolicy::InlineLiteral, pool)
            .update("t")
            .where_expr("id = 1");
    assert_eq!(pool.active_count(), 0);
    assert!(failed.sql().is_err());
    assert_eq!(pool.active_count(), 0);

    let abandoned =
        StatementBuilder::with_pool(NamingPolicy::LowerSnake, BindingPolicy::InlineLiteral, pool)
            .select(["a"]);
    assert_eq!(pool.active_count(), 1);
    drop(abandoned);
    assert_eq!(pool.active_count(), 0);
}

// ==================== Determinism ====================

#[test]
fn test_output_is_deterministic_across_threads() {
    fn build() -> String {
        SnakeNamed::select_from::<Account>()
            .where_(Condition::and(vec![
                Condition::in_list("id", [1, 2, 3]),
                Condition::like("lastName", "D%"),
            ]))
            .order_by("createdAt DESC")
            .build()
            .map(|s| format!("{} {:?}", s.sql(), s.params()))
            .unwrap()
    }

    let expected = build();
    let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(build)).collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
