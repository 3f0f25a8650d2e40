//! End-to-end session scenarios.
//!
//! These tests run the full stack — session, engine, statement, collection
//! — against a shared in-memory server, covering every execution mode and
//! the history retrieval paths.

use std::time::Duration;

use skein_client::{ClientError, ResultSet, Session, SessionConfig};
use skein_driver::{DriverConfig, MemoryDriver, MemoryServer, Value};
use skein_test::fixtures;

#[tokio::test]
async fn test_select_data_history_roundtrip() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);

    session.query("SELECT 1").await.unwrap();
    let result = session.data(None).await.unwrap();

    let rows = result.rows().expect("select produces rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("1"), Some(&Value::Integer(1)));

    // The newest history entry holds exactly the returned payload.
    let entry = session.history(0).expect("entry archived");
    assert_eq!(entry.seek(0).unwrap().as_result(), Some(&result));
}

#[tokio::test]
async fn test_insert_returns_id_not_rows() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);
    session.query("CREATE TABLE t (id)").await.unwrap();

    session.query("INSERT INTO t VALUES (1)").await.unwrap();
    assert!(session.is_async());

    let result = session.data(None).await.unwrap();
    assert_eq!(result.insert_id(), Some(1));
    assert!(result.rows().is_none());
    assert!(!session.is_async());
}

#[tokio::test]
async fn test_async_drain_matches_sync_execution() {
    let (_server, mut session) = fixtures::seeded().await;

    session.query("SELECT * FROM users").await.unwrap();
    let sync_result = session.data(Some("sync")).await.unwrap();

    session.submit("SELECT * FROM users").await.unwrap();
    let async_result = session.data(Some("async")).await.unwrap();

    assert_eq!(sync_result, async_result);
}

#[tokio::test]
async fn test_prepared_statement_scenario() {
    let (_server, mut session) = fixtures::seeded().await;

    session
        .bind("SELECT * FROM users WHERE id = ?", vec![2.into()])
        .await
        .unwrap();
    let result = session.data(Some("bob")).await.unwrap();

    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::String("Bob".to_string())));
}

#[tokio::test]
async fn test_multi_scenario() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);

    session.multi(&["SELECT 1", "SELECT 2"]).await.unwrap();
    let result = session.data(None).await.unwrap();

    let groups = result.groups().expect("multi produces row groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0][0].get("1"), Some(&Value::Integer(1)));
    assert_eq!(groups[1][0].get("2"), Some(&Value::Integer(2)));
}

#[tokio::test]
async fn test_batch_results_addressable_by_name() {
    let (_server, mut session) = fixtures::seeded().await;

    session
        .submit_batch(vec![
            ("alice".to_string(), "SELECT * FROM users WHERE id = 1".to_string()),
            ("carol".to_string(), "SELECT * FROM users WHERE id = 3".to_string()),
        ])
        .await
        .unwrap();
    session.data(Some("wave")).await.unwrap();

    // Name-based retrieval is independent of drain order.
    let carol = session.history("carol").unwrap();
    let rows = carol.seek(0).unwrap().as_result().unwrap().rows().unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::String("Carol".to_string())));

    let alice = session.history("alice").unwrap();
    let rows = alice.seek(0).unwrap().as_result().unwrap().rows().unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::String("Alice".to_string())));
}

#[tokio::test]
async fn test_fuzzy_history_lookup() {
    let (_server, mut session) = fixtures::seeded().await;

    session.query("SELECT * FROM users").await.unwrap();
    session.data(Some("user_listing")).await.unwrap();

    // The caller misremembers the key; closest edit distance wins.
    let entry = session.history_like("usr_listing").unwrap();
    assert_eq!(entry.name(), "user_listing");
}

#[tokio::test]
async fn test_reset_archives_instead_of_discarding() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);
    session.query("CREATE TABLE t (id)").await.unwrap();

    session.query("INSERT INTO t VALUES (7)").await.unwrap();
    let before = session.history_len();
    session.reset().await.unwrap();

    assert_eq!(session.history_len(), before + 1);
    // The row really was inserted, and its result archived.
    assert_eq!(server.row_count("t"), Some(1));
}

#[tokio::test]
async fn test_poll_timeout_keeps_result_retrievable() {
    let server = MemoryServer::new();
    let config = DriverConfig::default().async_latency(Duration::from_millis(80));
    let driver = MemoryDriver::connect(&config, &server).unwrap();
    let session_config = SessionConfig::new()
        .poll_interval(Duration::from_millis(1))
        .drain_timeout(Duration::from_millis(10));
    let mut session = Session::with_config(driver, session_config);

    session.submit("SELECT 1").await.unwrap();

    let err = session.data(None).await.unwrap_err();
    assert!(matches!(err, ClientError::PollTimeout(_)));
    assert!(session.is_async());

    // The handle stayed pending; once the statement completes, the result
    // is still there to drain.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let result = session.data(None).await.unwrap();
    assert!(result.rows().is_some());
    assert!(!session.is_async());
}

#[tokio::test]
async fn test_sessions_share_a_server() {
    let server = MemoryServer::new();
    let mut writer = fixtures::connect(&server);
    let mut reader = fixtures::connect(&server);

    writer.query("CREATE TABLE shared (id)").await.unwrap();
    writer.query("INSERT INTO shared VALUES (42)").await.unwrap();
    writer.data(None).await.unwrap();

    reader.query("SELECT * FROM shared").await.unwrap();
    let result = reader.data(None).await.unwrap();
    assert_eq!(result.row_count(), 1);
}

#[tokio::test]
async fn test_empty_session_has_no_result() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);

    let err = session.data(None).await.unwrap_err();
    assert_eq!(err, ClientError::NoResult);
    assert!(session.history(0).is_none());
}

#[tokio::test]
async fn test_repeated_inserts_merge_into_one_wave() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);
    session.query("CREATE TABLE t (id)").await.unwrap();

    session.query("INSERT INTO t VALUES (1)").await.unwrap();
    session.query("INSERT INTO t VALUES (2)").await.unwrap();
    session.query("INSERT INTO t VALUES (3)").await.unwrap();

    let result = session.data(Some("burst")).await.unwrap();
    // A mutation-bearing wave reports the last drained id; every insert is
    // archived individually.
    assert_eq!(result, ResultSet::InsertId(3));
    assert_eq!(server.row_count("t"), Some(3));
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let server = MemoryServer::new();
    let mut session = fixtures::connect(&server);

    session.query("CREATE TABLE logs (id, message)").await.unwrap();
    session.data(Some("ddl")).await.unwrap();

    session
        .query("INSERT INTO logs VALUES (1, 'started')")
        .await
        .unwrap();
    session.data(Some("first_log")).await.unwrap();

    session
        .bind("SELECT message FROM logs WHERE id = ?", vec![1.into()])
        .await
        .unwrap();
    let result = session.data(Some("lookup")).await.unwrap();
    assert_eq!(
        result.rows().unwrap()[0].get("message"),
        Some(&Value::String("started".to_string()))
    );

    assert_eq!(session.history_len(), 4);
    assert!(session.history("first_log").is_some());

    session.close().await.unwrap();
}
