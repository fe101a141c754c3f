use sybase_middleware::prelude::*;
use sybase_middleware::test_utils::{Script, test_options};

const NOOP: &str = "No columns to drop, add or modify";

#[test]
fn noop_column_change_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.fail("MODIFY", NOOP);
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;

        adapter
            .change_column("items", &ColumnSpec::new("qty", ColumnType::Integer))
            .await?;
        assert!(
            script
                .statements()
                .contains(&"ALTER TABLE [items] MODIFY [qty] int".to_string())
        );
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn other_alter_errors_propagate() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.fail("MODIFY", "Column name 'qty' does not exist in target table");
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;

        let err = adapter
            .change_column("items", &ColumnSpec::new("qty", ColumnType::Integer))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn change_column_with_default_replaces_the_bound_default() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.fail("MODIFY", NOOP).rows(
            "SELECT def.name AS name",
            &["name"],
            vec![vec![RowValues::Text("items_qty_1234 ".into())]],
        );
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let spec = ColumnSpec::new("qty", ColumnType::Integer)
            .not_null()
            .default(RowValues::Int(1));
        adapter.change_column("items", &spec).await?;

        let statements = script.statements();
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[0], "ALTER TABLE [items] MODIFY [qty] int NOT NULL");
        assert!(statements[1].contains("col.name = 'qty' AND tab.name = 'items'"));
        assert_eq!(statements[2], "ALTER TABLE [items] DROP CONSTRAINT [items_qty_1234]");
        assert_eq!(statements[3], "ALTER TABLE [items] REPLACE [qty] DEFAULT 1");
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn type_change_keeps_current_nullability() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let spec = ColumnSpec::new("qty", ColumnType::Decimal).precision(10, Some(2));
        adapter.change_column("items", &spec).await?;
        adapter.change_column("items", &spec.clone().nullable()).await?;

        assert_eq!(
            script.statements(),
            vec![
                "ALTER TABLE [items] MODIFY [qty] decimal(10,2)",
                "ALTER TABLE [items] MODIFY [qty] decimal(10,2) NULL",
            ]
        );
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn remove_column_drops_defaults_first() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        script.rows(
            "SELECT def.name AS name",
            &["name"],
            vec![vec![RowValues::Text("items_flag_99".into())]],
        );
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        adapter.remove_column("items", "flag").await?;
        let statements = script.statements();
        assert_eq!(
            &statements[1..],
            &[
                "ALTER TABLE [items] DROP CONSTRAINT [items_flag_99]".to_string(),
                "ALTER TABLE [items] DROP [flag]".to_string(),
            ]
        );
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn table_and_index_statements_reach_the_server() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        adapter
            .create_table(
                "people",
                &[ColumnSpec::new("name", ColumnType::String).limit(40).not_null()],
                &CreateTableOptions::default(),
            )
            .await?;
        adapter.rename_table("people", "persons").await?;
        adapter.rename_column("persons", "name", "full_name").await?;
        adapter
            .add_index("persons", &["full_name".to_string()], false, None)
            .await?;
        adapter
            .remove_index("persons", "index_persons_on_full_name")
            .await?;
        adapter.drop_table("persons").await?;

        assert_eq!(
            script.statements(),
            vec![
                "CREATE TABLE [people] ([id] numeric(9,0) IDENTITY PRIMARY KEY, [name] varchar(40) NOT NULL)",
                "EXEC sp_rename 'people', 'persons'",
                "EXEC sp_rename 'persons.name', 'full_name'",
                "CREATE INDEX [index_persons_on_full_name] ON [persons] ([full_name])",
                "DROP INDEX [persons].[index_persons_on_full_name]",
                "DROP TABLE [persons]",
            ]
        );
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}

#[test]
fn invalid_decimal_definition_is_rejected_before_sending() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let script = Script::new();
        let mut adapter = SybaseAdapter::connect(script.connector(), test_options()).await?;
        script.clear_statements();

        let spec = ColumnSpec::new("ratio", ColumnType::Decimal).precision(4, Some(6));
        assert!(adapter.add_column("items", &spec).await.is_err());
        assert!(script.statements().is_empty());
        Ok::<(), SybaseDbError>(())
    })?;
    Ok(())
}
