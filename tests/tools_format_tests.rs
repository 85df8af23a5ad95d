use sqlbridge::executor::{ColumnDescription, QueryOutput, SchemaColumn};
use sqlbridge::tools::{
    render_column_list, render_query_output, render_schema, render_table_list,
    sql_assistant_prompt,
};

#[test]
fn query_output_renders_as_pipe_table() {
    let output = QueryOutput {
        columns: vec!["id".to_string(), "name".to_string()],
        rows: vec![
            vec!["1".to_string(), "alice".to_string()],
            vec!["2".to_string(), "bob".to_string()],
        ],
    };

    assert_eq!(
        render_query_output(&output),
        "2 rows:\nid | name\n1 | alice\n2 | bob"
    );
}

#[test]
fn empty_result_set_has_a_fixed_message() {
    let output = QueryOutput {
        columns: vec![],
        rows: vec![],
    };
    assert_eq!(render_query_output(&output), "No rows returned.");
}

#[test]
fn table_list_is_a_counted_bullet_list() {
    let names = vec!["orders".to_string(), "users".to_string()];
    assert_eq!(
        render_table_list(&names),
        "Available tables (2):\n- orders\n- users"
    );
}

#[test]
fn column_list_carries_type_and_nullability() {
    let columns = vec![
        ColumnDescription {
            name: "id".to_string(),
            data_type: "integer".to_string(),
            nullable: false,
        },
        ColumnDescription {
            name: "email".to_string(),
            data_type: "text".to_string(),
            nullable: true,
        },
    ];

    assert_eq!(
        render_column_list("users", &columns),
        "Table 'users' structure:\nid (integer) NOT NULL\nemail (text) NULL"
    );
}

#[test]
fn schema_dump_groups_columns_by_table() {
    let columns = vec![
        SchemaColumn {
            table_name: "orders".to_string(),
            column_name: "id".to_string(),
            data_type: "integer".to_string(),
            is_nullable: "NO".to_string(),
            column_default: Some("nextval('orders_id_seq'::regclass)".to_string()),
        },
        SchemaColumn {
            table_name: "orders".to_string(),
            column_name: "total".to_string(),
            data_type: "numeric".to_string(),
            is_nullable: "YES".to_string(),
            column_default: None,
        },
        SchemaColumn {
            table_name: "users".to_string(),
            column_name: "id".to_string(),
            data_type: "integer".to_string(),
            is_nullable: "NO".to_string(),
            column_default: None,
        },
    ];

    let rendered = render_schema(&columns);
    assert_eq!(
        rendered,
        "PostgreSQL Database Schema:\n\
         \nTable: orders\n\
         \x20 id (integer) NOT NULL DEFAULT nextval('orders_id_seq'::regclass)\n\
         \x20 total (numeric) NULL\n\
         \nTable: users\n\
         \x20 id (integer) NOT NULL\n"
    );
}

#[test]
fn assistant_prompt_mentions_the_table_when_given() {
    let with_table = sql_assistant_prompt("find inactive accounts", Some("users"));
    assert!(with_table.contains("I need help writing a PostgreSQL query to: find inactive accounts"));
    assert!(with_table.contains("Focusing on table: users"));

    let without_table = sql_assistant_prompt("find inactive accounts", None);
    assert!(!without_table.contains("Focusing on table"));
    assert!(without_table.ends_with("proper PostgreSQL syntax."));
}
