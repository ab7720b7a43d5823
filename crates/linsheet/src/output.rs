//! Rendering of evaluation results.

use std::io::{self, Write};
use std::str::FromStr;

use linsheet_common::CellId;
use linsheet_eval::EvalResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<name> = <value>` per resolved cell.
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?} (expected text or json)")),
        }
    }
}

/// Outcome of one run, ready to render.
#[derive(Debug, Clone)]
pub struct Report {
    /// Resolved cells ordered by id.
    pub values: Vec<(CellId, i64)>,
    pub unresolved: Vec<CellId>,
    pub summary: EvalResult,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    cells: serde_json::Map<String, serde_json::Value>,
    unresolved: &'a [CellId],
}

impl Report {
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (cell, value) in &self.values {
            writeln!(out, "{cell} = {value}")?;
        }
        Ok(())
    }

    fn json_report(&self) -> JsonReport<'_> {
        let cells = self
            .values
            .iter()
            .map(|(cell, value)| (cell.to_string(), serde_json::Value::from(*value)))
            .collect();
        JsonReport {
            cells,
            unresolved: &self.unresolved,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.json_report())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &self.json_report())?;
        writeln!(out)
    }

    pub fn write<W: Write>(&self, format: OutputFormat, out: &mut W) -> io::Result<()> {
        match format {
            OutputFormat::Text => self.write_text(out),
            OutputFormat::Json => self.write_json(out),
        }
    }
}
