//! Output views for a constructed model.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use dbmodel_core::Database;

/// Which view of the model to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Nested export tree as JSON
    Export,
    /// Flat identifier-keyed buckets as JSON
    Normalize,
    /// Per-schema entity counts as a table
    Summary,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Export => write!(f, "export"),
            View::Normalize => write!(f, "normalize"),
            View::Summary => write!(f, "summary"),
        }
    }
}

/// Render `db` in the requested view.
pub fn render(db: &Database, view: View, compact: bool) -> Result<String, serde_json::Error> {
    match view {
        View::Export => to_json(&db.export(), compact),
        View::Normalize => to_json(&db.normalize(), compact),
        View::Summary => Ok(summary_table(db)),
    }
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

fn summary_table(db: &Database) -> String {
    if db.schemas().is_empty() {
        return "No schemas".to_string();
    }

    let model = db.model();
    let mut table = Table::new();
    table.set_header(vec![
        "Schema", "Alias", "Tables", "Fields", "Enums", "Refs", "Tags", "Groups",
    ]);

    for id in db.schemas() {
        let schema = db.schema(*id);
        let fields: usize = schema
            .tables
            .iter()
            .map(|t| model.tables[*t].fields.len())
            .sum();

        table.add_row(vec![
            Cell::new(&schema.name),
            Cell::new(schema.alias.as_deref().unwrap_or("-")),
            Cell::new(schema.tables.len()),
            Cell::new(fields),
            Cell::new(schema.enums.len()),
            Cell::new(schema.refs.len()),
            Cell::new(schema.tags.len()),
            Cell::new(schema.table_groups.len()),
        ]);
    }

    table.to_string()
}
