use sql_access::prelude::*;
use sql_access::test_utils::{MockDriver, ScriptedResult, result_set};

#[test]
fn procedure_collects_result_sets_in_order() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let handle = driver.handle();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    handle.push_script(ScriptedResult {
        result_sets: vec![
            result_set(
                &["id"],
                vec![vec![Value::Int(1)], vec![Value::Int(2)]],
            ),
            // Second result set is empty and must surface as None
            result_set(&["id"], vec![]),
        ],
        rows_affected: 0,
    });

    let params = params![
        "from" => Value::Text("2024-01-01".into()),
        "to" => Value::Text("2024-12-31".into()),
    ];
    let results = db.execute_procedure("yearly_report", &params)?;

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().expect("first set has rows");
    assert_eq!(first.len(), 2);
    assert_eq!(first.rows[1].get("id"), Some(&Value::Int(2)));
    assert!(results[1].is_none());

    let executed = handle.executed();
    assert_eq!(executed[0].sql, "CALL yearly_report(:from, :to)");
    let names: Vec<&str> = executed[0].binds.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["from", "to"]);
    Ok(())
}

#[test]
fn procedure_with_single_empty_set() -> Result<(), SqlAccessError> {
    let driver = MockDriver::new();
    let mut db = DbClient::new(driver, "mock://localhost/app");

    // Nothing scripted: one empty result set.
    let results = db.execute_procedure("cleanup", &Params::new())?;
    assert_eq!(results.len(), 1);
    assert!(results[0].is_none());
    Ok(())
}
