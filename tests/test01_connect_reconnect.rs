use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;

use sql_access::prelude::*;
use sql_access::test_utils::MockDriver;

#[test]
fn connect_is_idempotent_without_interval() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    db.connect()?;
    db.connect()?;
    assert_eq!(handle.connects(), 1);
    assert!(db.is_connected());
    Ok(())
}

#[test]
fn close_forces_reconnect() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    db.connect()?;
    db.close();
    assert!(!db.is_connected());
    db.connect()?;
    assert_eq!(handle.connects(), 2);
    Ok(())
}

#[test]
fn interval_reconnect_invokes_hook_once_per_physical_connect() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&hook_calls);

    let mut db = DbClient::new(driver, "mock://localhost/app")
        .with_reconnect_interval(1)
        .on_connect(move |conn| {
            hook_counter.fetch_add(1, Ordering::SeqCst);
            conn.exec_raw("SET NAMES utf8").map(|_| ())
        });

    db.connect()?;
    db.connect()?;
    assert_eq!(handle.connects(), 1);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(1100));
    db.connect()?;
    assert_eq!(handle.connects(), 2);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 2);

    // Session-setup SQL ran on each physical connection.
    let setup: Vec<_> = handle
        .executed()
        .into_iter()
        .filter(|stmt| stmt.sql == "SET NAMES utf8")
        .collect();
    assert_eq!(setup.len(), 2);
    Ok(())
}

#[test]
fn connect_failure_propagates_and_next_attempt_recovers() {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    handle.fail_next_connect();
    assert!(matches!(
        db.connect(),
        Err(SqlAccessError::ConnectionError(_))
    ));
    assert!(!db.is_connected());

    db.connect().unwrap();
    assert_eq!(handle.connects(), 1);
}

#[test]
fn caller_options_override_dsn_query_options() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut options = sql_access::IndexMap::new();
    options.insert("charset".to_string(), "latin1".to_string());
    options.insert("extra".to_string(), "1".to_string());

    let mut db = DbClient::new(
        driver,
        "mysql://app:pw@db.internal:3307/orders?charset=utf8&timeout=5",
    )
    .with_options(options);
    db.connect()?;

    let opts = handle.last_connect_options().expect("connected");
    assert_eq!(opts.driver, "mysql");
    assert_eq!(opts.host, "db.internal");
    assert_eq!(opts.port, 3307);
    assert_eq!(opts.database.as_deref(), Some("orders"));
    assert_eq!(opts.user.as_deref(), Some("app"));
    assert_eq!(opts.options["charset"], "latin1");
    assert_eq!(opts.options["timeout"], "5");
    assert_eq!(opts.options["extra"], "1");
    Ok(())
}

#[test]
fn dialect_inferred_from_scheme() {
    let db = DbClient::new(MockDriver::new(), "mysql://localhost/app");
    assert_eq!(db.dialect(), BindDialect::MySql);

    let db = DbClient::new(MockDriver::new(), "mock://localhost/app");
    assert_eq!(db.dialect(), BindDialect::Generic);
}

#[test]
fn last_insert_id_requires_live_connection() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    assert!(matches!(
        db.last_insert_id(None),
        Err(SqlAccessError::ConnectionError(_))
    ));

    handle.set_last_insert_id(41);
    db.connect()?;
    assert_eq!(db.last_insert_id(None)?, Some(41));
    Ok(())
}
