use crate::filter::OperatorRegistry;
use crate::record::LogRecord;
use crate::schema::Schema;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::{Value, json};
use std::fmt::Write as _;

/// Table with the house style and bold headers
pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

/// Render search results as a text report
pub fn format_results_text(records: &[LogRecord]) -> String {
    let mut out = String::new();
    let summary = format!(
        "SEARCH matched {} entr{}",
        records.len(),
        if records.len() == 1 { "y" } else { "ies" }
    );
    let _ = writeln!(out, "{}", summary.bold());

    if records.is_empty() {
        let _ = writeln!(out, "No matching log entries found.");
        return out;
    }

    let mut table = create_styled_table(&["id", "browser", "country", "page_url", "created", "message"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&record.browser),
            Cell::new(&record.country),
            Cell::new(&record.page_url),
            Cell::new(record.created_text()),
            Cell::new(record.message.replace('\n', "\\n")),
        ]);
    }
    let _ = writeln!(out, "{table}");
    out
}

/// Render search results as a JSON array of flat records
pub fn format_results_json(records: &[LogRecord]) -> String {
    let rows: Vec<Value> = records.iter().map(LogRecord::to_flat_json).collect();
    serde_json::to_string_pretty(&rows)
        .unwrap_or_else(|_| "{\"error\":\"failed to serialize search results\"}".into())
}

/// Render the schema and operator list as text
pub fn format_fields_text(schema: &Schema, registry: &OperatorRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Fields of '{}'", schema.name()).bold());

    let mut table = create_styled_table(&["field", "type", "sort key"]);
    for field in schema.fields() {
        let sort_position = schema
            .sort_keys()
            .iter()
            .position(|key| key == &field.name)
            .map(|idx| (idx + 1).to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.kind),
            Cell::new(sort_position),
        ]);
    }
    let _ = writeln!(out, "{table}");

    let _ = writeln!(out, "{}", "Operators".bold());
    let _ = writeln!(out, "  {}", registry.names().join(", "));
    out
}

/// Render the schema and operator list as JSON
pub fn format_fields_json(schema: &Schema, registry: &OperatorRegistry) -> String {
    let doc = json!({
        "schema": schema.name(),
        "fields": schema
            .fields()
            .iter()
            .map(|field| json!({"name": field.name, "type": field.kind.to_string()}))
            .collect::<Vec<_>>(),
        "sort_keys": schema.sort_keys(),
        "operators": registry.names(),
    });
    serde_json::to_string_pretty(&doc)
        .unwrap_or_else(|_| "{\"error\":\"failed to serialize schema\"}".into())
}
