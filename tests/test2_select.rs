use sybase_middleware::prelude::*;
use sybase_middleware::test_utils::{Script, test_options};

fn text(s: &str) -> RowValues {
    RowValues::Text(s.to_string())
}

fn items(script: &Script) {
    script.rows(
        "FROM items",
        &["id", "code", "price"],
        vec![
            vec![text("1"), text("007"), text("1.50")],
            vec![text("2"), text("010"), text("2.25")],
            vec![text("3"), text("abc"), RowValues::Decimal("3".into())],
        ],
    );
}

#[test]
fn limit_and_offset_bracket_the_query_with_rowcount() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        items(&script);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let rs = adapter
            .select_all("SELECT * FROM items", SelectOptions::limit(2).with_offset(1))
            .await?;
        assert_eq!(
            script.statements(),
            vec!["SET ROWCOUNT 3", "SELECT * FROM items", "SET ROWCOUNT 0"]
        );

        // the scripted server ignores ROWCOUNT, so only the offset is applied client-side
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.results[0].get("id"), Some(&RowValues::Int(2)));
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn huge_windows_are_clamped_to_the_rowcount_range() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        items(&script);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let rs = adapter
            .select_all("SELECT * FROM items", SelectOptions::limit(usize::MAX).with_offset(1))
            .await?;
        assert_eq!(rs.len(), 2);
        assert_eq!(
            script.statements(),
            vec!["SET ROWCOUNT 2147483647", "SELECT * FROM items", "SET ROWCOUNT 0"]
        );

        script.clear_statements();
        adapter
            .select_all("SELECT * FROM items", SelectOptions::limit(3_000_000_000))
            .await?;
        assert_eq!(script.statements()[0], "SET ROWCOUNT 2147483647");
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn unlimited_select_sends_only_the_query() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        items(&script);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let rs = adapter
            .select_all("SELECT * FROM items", SelectOptions::default())
            .await?;
        assert_eq!(rs.len(), 3);
        assert_eq!(script.statements(), vec!["SELECT * FROM items"]);

        let empty = adapter
            .select_all("SELECT * FROM items", SelectOptions::limit(0))
            .await?;
        assert!(empty.is_empty());
        assert_eq!(script.statements().len(), 1);
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn rowcount_is_reset_when_the_query_fails() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.fail("FROM missing", "Invalid object name 'missing'");
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let err = adapter
            .select_all("SELECT * FROM missing", SelectOptions::limit(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SybaseDbError::StatementInvalid { .. }));
        assert!(err.to_string().contains("Invalid object name"));
        assert_eq!(script.statements().last().map(String::as_str), Some("SET ROWCOUNT 0"));
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn numconvert_turns_numeric_text_into_numbers() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        items(&script);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;

        let rs = adapter
            .select_all("SELECT * FROM items", SelectOptions::default())
            .await?;
        let first = &rs.results[0];
        assert_eq!(first.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(first.get("code"), Some(&text("007")));
        assert_eq!(first.get("price"), Some(&RowValues::Float(1.5)));
        assert_eq!(rs.results[2].get("code"), Some(&text("abc")));
        assert_eq!(rs.results[2].get("price"), Some(&RowValues::Int(3)));
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn numconvert_off_keeps_driver_values() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        items(&script);
        let options = SybaseOptions::builder("localhost".into(), "testdb".into(), "sa".into(), String::new())
            .numconvert(false)
            .finish();
        let mut adapter = SybaseAdapter::connect(script.connector(), options).await?;

        let rs = adapter
            .select_all("SELECT * FROM items", SelectOptions::default())
            .await?;
        assert_eq!(rs.results[0].get("id"), Some(&text("1")));
        assert_eq!(rs.results[0].get("price"), Some(&text("1.50")));
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn select_one_and_select_value_use_a_single_row_window() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.rows("COUNT(*)", &["n"], vec![vec![RowValues::Int(42)]]);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let value = adapter.select_value("SELECT COUNT(*) AS n FROM items").await?;
        assert_eq!(value, Some(RowValues::Int(42)));
        assert_eq!(script.statements()[0], "SET ROWCOUNT 1");

        let none = adapter.select_one("SELECT * FROM nothing").await?;
        assert!(none.is_none());
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn update_and_delete_report_affected_rows() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.affected("UPDATE items", 3).affected("DELETE FROM items", 1);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;

        assert_eq!(adapter.update("UPDATE items SET price = 0").await?, 3);
        assert_eq!(adapter.delete("DELETE FROM items WHERE id = 1").await?, 1);
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}
