use crate::error::CliError;
use driver::connection::SchemaChange;
use model::{
    core::{bounds::bounds_of, bounds::bounded_types, value::Value},
    records::row::{ColumnSpec, Row},
};
use serde_json::{Map, Number, json};
use std::io::Write;

/// Writes statement results either as a plain table or as JSON lines.
pub struct Printer<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn page_header(
        &mut self,
        page: usize,
        rows: usize,
        columns: &[ColumnSpec],
    ) -> Result<(), CliError> {
        if self.json {
            return Ok(());
        }
        writeln!(self.out, "-- page {page} ({rows} rows)")?;
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(self.out, "{}", names.join(" | "))?;
        Ok(())
    }

    pub fn row(&mut self, page: usize, row: &Row) -> Result<(), CliError> {
        if self.json {
            let line = json!({ "page": page, "row": row_to_json(row) });
            writeln!(self.out, "{}", serde_json::to_string(&line)?)?;
        } else {
            let cells: Vec<String> = row.values().iter().map(Value::to_string).collect();
            writeln!(self.out, "{}", cells.join(" | "))?;
        }
        Ok(())
    }

    pub fn summary(&mut self, rows: usize, pages: usize) -> Result<(), CliError> {
        if self.json {
            return Ok(());
        }
        writeln!(self.out, "({rows} rows, {pages} pages)")?;
        Ok(())
    }

    pub fn schema_change(&mut self, change: &SchemaChange) -> Result<(), CliError> {
        let target = match &change.table {
            Some(table) => format!("{}.{table}", change.keyspace),
            None => change.keyspace.clone(),
        };
        if self.json {
            let line = json!({
                "schema_change": change.change.to_string(),
                "target": target,
                "schema_version": change.schema_version.to_string(),
            });
            writeln!(self.out, "{}", serde_json::to_string(&line)?)?;
        } else {
            writeln!(self.out, "-- {} {target}", change.change)?;
        }
        Ok(())
    }

    pub fn message(&mut self, message: &str) -> Result<(), CliError> {
        if self.json {
            let line = json!({ "status": message });
            writeln!(self.out, "{}", serde_json::to_string(&line)?)?;
        } else {
            writeln!(self.out, "-- {message}")?;
        }
        Ok(())
    }

    pub fn bounds(&mut self) -> Result<(), CliError> {
        let table: Vec<_> = bounded_types()
            .into_iter()
            .filter_map(|cql_type| bounds_of(cql_type).map(|bounds| (cql_type, bounds)))
            .collect();

        if self.json {
            let entries: Vec<_> = table
                .iter()
                .map(|(cql_type, bounds)| {
                    json!({
                        "type": cql_type.cql_name(),
                        "min": value_to_json(&bounds.min),
                        "max": value_to_json(&bounds.max),
                    })
                })
                .collect();
            writeln!(self.out, "{}", serde_json::to_string_pretty(&entries)?)?;
            return Ok(());
        }

        writeln!(self.out, "{:<10} {:<26} {}", "type", "min", "max")?;
        for (cql_type, bounds) in &table {
            writeln!(
                self.out,
                "{:<10} {:<26} {}",
                cql_type.cql_name(),
                bounds.min.to_string(),
                bounds.max.to_string()
            )?;
        }
        Ok(())
    }
}

pub fn row_to_json(row: &Row) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = row
        .iter()
        .map(|(column, value)| (column.name.clone(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// JSON form of a cell. Numbers that JSON cannot carry exactly (non-finite
/// floats, decimals, varints) are written as strings.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(v) => json!(v),
        Value::Tinyint(v) => json!(v),
        Value::Smallint(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Bigint(v) | Value::Counter(v) => json!(v),
        Value::Float(v) => float_to_json(*v as f64, value),
        Value::Double(v) => float_to_json(*v, value),
        Value::Decimal(v) => json!(v.to_string()),
        Value::Varint(v) => json!(v.to_string()),
        Value::Ascii(v) | Value::Text(v) => json!(v),
        Value::Blob(_) => json!(value.to_string()),
        Value::Uuid(v) | Value::Timeuuid(v) => json!(v.to_string()),
        Value::Timestamp(v) => json!(v.to_rfc3339()),
    }
}

fn float_to_json(v: f64, value: &Value) -> serde_json::Value {
    Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| json!(value.to_string()))
}
