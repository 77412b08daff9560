use chrono::NaiveDate;
use serde_json::json;

use sql_access::prelude::*;
use sql_access::test_utils::MockDriver;

fn ts() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(14, 30, 5)
        .unwrap()
}

#[test]
fn base_dispatch_produces_documented_tags() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    let params = params![
        "i" => Value::Int(7),
        "s" => Value::Text("x".into()),
        "f" => Value::Float(1.5),
        "b" => Value::Bool(true),
        "n" => Value::Null,
        "j" => Value::Json(json!({"x": 1})),
    ];
    db.execute("UPDATE t SET v = :i WHERE 1", &params)?;

    let executed = handle.executed();
    assert_eq!(executed.len(), 1);
    let binds = &executed[0].binds;
    assert_eq!(binds.len(), 6);

    assert_eq!(binds[0].name, "i");
    assert_eq!(binds[0].value, Value::Int(7));
    assert_eq!(binds[0].tag, ParamType::Int);

    assert_eq!(binds[1].tag, ParamType::Str);
    assert_eq!(binds[2].value, Value::Float(1.5));
    assert_eq!(binds[2].tag, ParamType::Str);

    assert_eq!(binds[3].value, Value::Bool(true));
    assert_eq!(binds[3].tag, ParamType::Bool);

    assert_eq!(binds[4].value, Value::Null);
    assert_eq!(binds[4].tag, ParamType::Null);

    // JSON serializes to text and binds as a string
    assert_eq!(binds[5].value, Value::Text("{\"x\":1}".into()));
    assert_eq!(binds[5].tag, ParamType::Str);
    Ok(())
}

#[test]
fn mysql_dialect_normalizes_before_dispatch() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mysql://localhost/app");

    let params = params![
        "t" => Value::Bool(true),
        "f" => Value::Bool(false),
        "empty" => Value::Text(String::new()),
        "blank" => Value::Text("  \t ".into()),
        "kept" => Value::Text("kept".into()),
        "when" => Value::Timestamp(ts()),
    ];
    db.execute("UPDATE t SET v = :t WHERE 1", &params)?;

    let binds = handle.executed()[0].binds.clone();

    assert_eq!(binds[0].value, Value::Int(1));
    assert_eq!(binds[0].tag, ParamType::Int);
    assert_eq!(binds[1].value, Value::Int(0));
    assert_eq!(binds[1].tag, ParamType::Int);

    assert_eq!(binds[2].value, Value::Null);
    assert_eq!(binds[2].tag, ParamType::Null);
    assert_eq!(binds[3].value, Value::Null);
    assert_eq!(binds[3].tag, ParamType::Null);

    assert_eq!(binds[4].value, Value::Text("kept".into()));
    assert_eq!(binds[4].tag, ParamType::Str);

    assert_eq!(binds[5].value, Value::Text("2024-03-09 14:30:05".into()));
    assert_eq!(binds[5].tag, ParamType::Str);
    Ok(())
}

#[test]
fn empty_params_take_the_non_prepared_path() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    handle.push_affected(3);
    let affected = db.execute("DELETE FROM stale", &Params::new())?;
    assert_eq!(affected, 3);

    let executed = handle.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].sql, "DELETE FROM stale");
    assert!(executed[0].binds.is_empty());
    Ok(())
}
