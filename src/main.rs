use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use infoschema::catalog::{ChangeCounter, SqliteCatalog};
use infoschema::config::{Config, OutputFormat};
use infoschema::rights::{AccessControl, GranteeManager};
use infoschema::system::stats::{format_cache_status_as_table, log_cache_status};
use infoschema::{InformationSchema, QueryResult};

const DEFAULT_QUERY: &str =
    "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE FROM INFORMATION_SCHEMA.TABLES ORDER BY TABLE_SCHEMA, TABLE_NAME";

fn main() -> Result<()> {
    let config = Config::load();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    info!("infoschema v{}", env!("CARGO_PKG_VERSION"));

    let counter = ChangeCounter::new();
    let catalog = match config.database_path() {
        Some(path) => {
            info!("Using database: {}", path.display());
            SqliteCatalog::open(&path, &config.owner, counter.clone())
        }
        None => {
            info!("Using in-memory database");
            SqliteCatalog::open_in_memory(&config.owner, counter.clone())
        }
    }
    .map_err(|e| anyhow!("Failed to open database: {}", e))?;

    let grants = GranteeManager::new(counter);
    if let Some(path) = &config.grants {
        grants
            .load_file(path)
            .map_err(|e| anyhow!("Failed to load grants from {}: {}", path.display(), e))?;
    }
    if !grants.exists(&config.owner) {
        grants.create_admin(&config.owner)?;
    }

    let engine = InformationSchema::open(Arc::new(catalog), Arc::new(grants), config.engine_settings())?;
    let mut session = engine.new_session(&config.user)?;

    let sql = match (&config.query, &config.table) {
        (Some(query), _) => query.clone(),
        (None, Some(table)) => format!("SELECT * FROM {table}"),
        (None, None) => DEFAULT_QUERY.to_string(),
    };
    let Some(result) = engine.query(&mut session, &sql)? else {
        bail!("Not a query over a system table: {}", sql);
    };

    match config.format {
        OutputFormat::Table => print_result(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result.to_json())?),
    }

    if config.cache_status {
        let statuses = engine.cache_statuses();
        log_cache_status(&statuses);
        let (columns, rows) = format_cache_status_as_table(&statuses);
        print_table(&columns, &rows);
    }

    Ok(())
}

fn print_result(result: &QueryResult) {
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    print_table(&result.columns, &rows);
    println!("({} rows)", rows.len());
}

fn print_table(columns: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    println!("{}", line(columns));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in rows {
        println!("{}", line(row));
    }
}
