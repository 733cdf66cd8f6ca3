#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

pub const ORDERS_SQL: &str = "SELECT `order_id`, amount\nFROM raw.orders\nWHERE day = '{{ds}}'\n";

/// Four-task workflow covering every task kind, written next to its SQL/DDL/markdown.
pub fn full_workflow() -> Value {
    json!({
        "configuration_id": "sales_daily",
        "environment": "PROD",
        "start_date": "2021, 3, 1",
        "schedule_interval": "0 6 * * *",
        "short_description": "Daily sales rollup",
        "doc_md": "dag.md",
        "default_gcp_project_id": "acme-dwh",
        "default_dataset": "sales",
        "default_write_disposition": "WRITE_TRUNCATE",
        "account": "acct-7",
        "owner_team": "analytics",
        "task_dependencies": [
            "create_orders >> load_orders",
            "load_orders >> [copy_orders, export_vm]"
        ],
        "workflow": [
            {"id": "create_orders", "task_type": "create_gbq_table",
             "ddl_file": "ddl/orders.json", "bq_table": "orders"},
            {"id": "load_orders", "sql_file": "sql/orders.sql", "table_name": "orders",
             "short_description": "Load orders", "doc_md": "docs/load_orders.md"},
            {"id": "copy_orders", "task_type": "copy_gbq_table",
             "source_gcp_project_id": "acme-dwh", "source_bq_dataset": "sales",
             "source_bq_table": "orders", "destination_bq_table": "orders_backup",
             "destination_bq_table_date_suffix": true,
             "destination_bq_table_date_suffix_format": "%Y%m%d"},
            {"id": "export_vm", "task_type": "vm_launcher",
             "script_to_execute": ["echo export"], "vm_core_number": 2}
        ]
    })
}

pub fn write_project(dir: &Path, doc: &Value) -> PathBuf {
    std::fs::create_dir_all(dir.join("sql")).unwrap();
    std::fs::create_dir_all(dir.join("ddl")).unwrap();
    std::fs::create_dir_all(dir.join("docs")).unwrap();
    std::fs::write(dir.join("sql/orders.sql"), ORDERS_SQL).unwrap();
    std::fs::write(
        dir.join("ddl/orders.json"),
        json!({
            "bq_table_description": "Orders",
            "bq_table_schema": [{"name": "order_id", "type": "STRING", "mode": "REQUIRED"}],
            "bq_table_clustering_fields": ["order_id"]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(dir.join("docs/load_orders.md"), "Loads the `orders` table.").unwrap();
    std::fs::write(dir.join("dag.md"), "# Sales\nDaily rollup.").unwrap();

    let spec_path = dir.join("sales.json");
    std::fs::write(&spec_path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
    spec_path
}

pub fn project() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(dir.path(), &full_workflow());
    (dir, path)
}
