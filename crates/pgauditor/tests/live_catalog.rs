//! Round trips against a real PostgreSQL server.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use sqlx::postgres::PgPool;

use pgauditor::prelude::*;
use pgauditor_core::prelude::*;

const SCHEMA: &str = "pgauditor_it";
const LONG_COLUMN: &str = "a_column_name_long_enough_that_its_audit_columns_get_clipped_x";

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url).await.unwrap()
}

async fn apply(pool: &PgPool, script: &DdlScript) {
    for statement in script.statements() {
        sqlx::raw_sql(statement).execute(pool).await.unwrap();
    }
}

async fn reset(pool: &PgPool) {
    sqlx::raw_sql(&format!(
        "DROP SCHEMA IF EXISTS {SCHEMA} CASCADE;
         CREATE SCHEMA {SCHEMA};
         CREATE TABLE {SCHEMA}.account (
             id integer PRIMARY KEY,
             name text,
             balance numeric(10,2),
             meta json,
             {LONG_COLUMN} text
         );"
    ))
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_audit_round_trip() {
    let pool = pool().await;
    reset(&pool).await;
    let catalog = PgCatalog::new(pool.clone());

    let columns = catalog.columns(SCHEMA, "account").await.unwrap().unwrap();
    assert_eq!(
        columns,
        vec![
            ColumnDescriptor::new("id", "integer"),
            ColumnDescriptor::new("name", "text"),
            ColumnDescriptor::new("balance", "numeric(10,2)"),
            ColumnDescriptor::new("meta", "json"),
            ColumnDescriptor::new(LONG_COLUMN, "text"),
        ]
    );
    assert!(catalog.columns(SCHEMA, "missing").await.unwrap().is_none());

    let table = TableIdentity::new(SCHEMA, "account").unwrap();
    let synthesizer = DdlSynthesizer::new(
        table.clone(),
        AuthenticationMode::Database,
        SynthesisOptions::new().capture_application_name(true),
    );
    let script = synthesizer.synthesize(&catalog).await.unwrap();
    apply(&pool, &script).await;

    assert!(catalog.table_exists(SCHEMA, "aud_account").await.unwrap());
    assert!(catalog.sequence_exists(SCHEMA, "pgauditor_audit_seq").await.unwrap());
    assert!(catalog.enum_type_exists(SCHEMA, "pgauditor_operation").await.unwrap());
    assert!(catalog.function_exists(SCHEMA, "pgauditor_setting").await.unwrap());
    assert!(catalog
        .trigger_exists(SCHEMA, "account", "tau_aud_account")
        .await
        .unwrap());

    sqlx::raw_sql(&format!(
        "INSERT INTO {SCHEMA}.account VALUES (1, 'alice', 10.00, '{{\"a\": 1}}', 'x');
         UPDATE {SCHEMA}.account SET name = 'alice', meta = meta WHERE id = 1;
         UPDATE {SCHEMA}.account SET balance = 12.50 WHERE id = 1;
         DELETE FROM {SCHEMA}.account WHERE id = 1;"
    ))
    .execute(&pool)
    .await
    .unwrap();

    let rows = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<String>)>(
        &format!(
            "SELECT operation::text, changed_by, old_balance::text, new_balance::text
             FROM {SCHEMA}.aud_account ORDER BY audit_id"
        ),
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0, "INSERT");
    assert_eq!(rows[0].3.as_deref(), Some("10.00"));
    assert_eq!(rows[1].0, "UPDATE");
    assert_eq!(rows[1].2.as_deref(), Some("10.00"));
    assert_eq!(rows[1].3.as_deref(), Some("12.50"));
    assert_eq!(rows[2].0, "DELETE");
    assert_eq!(rows[2].2.as_deref(), Some("12.50"));
    assert!(rows.iter().all(|row| row.1.is_some()));

    // A second run replaces the functions and triggers only.
    let rerun = synthesizer.synthesize(&catalog).await.unwrap();
    assert!(!rerun
        .statements()
        .iter()
        .any(|s| s.starts_with("CREATE TABLE")));
    apply(&pool, &rerun).await;

    let drop = DdlSynthesizer::new(
        table,
        AuthenticationMode::Database,
        SynthesisOptions::new().drop_mode(true),
    );
    let script = drop.synthesize(&catalog).await.unwrap();
    assert_eq!(script.len(), 6);
    apply(&pool, &script).await;
    assert!(!catalog
        .trigger_exists(SCHEMA, "account", "tai_aud_account")
        .await
        .unwrap());
    assert!(!catalog.function_exists(SCHEMA, "fad_account").await.unwrap());
    assert!(catalog.table_exists(SCHEMA, "aud_account").await.unwrap());

    sqlx::raw_sql(&format!("DROP SCHEMA {SCHEMA} CASCADE"))
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_session_is_read_only() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let options: sqlx::postgres::PgConnectOptions = url.parse().unwrap();
    let settings = ConnectionSettings {
        host: options.get_host().to_string(),
        port: options.get_port(),
        username: options.get_username().to_string(),
        password: std::env::var("PGPASSWORD").ok(),
        database: options.get_database().unwrap_or("postgres").to_string(),
    };
    let catalog = PgCatalog::connect(&settings).await.unwrap();
    assert!(!catalog.table_exists("public", "pgauditor_missing").await.unwrap());
    catalog.close().await;

    let pool = PgPool::connect_with(settings.connect_options()).await.unwrap();
    let read_only: String = sqlx::query_scalar("SHOW transaction_read_only")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(read_only, "on");
}
