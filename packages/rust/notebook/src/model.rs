//! Notebook document model.
//!
//! Cells and the document keep their original JSON maps so key order and
//! number text survive a read/write cycle. Typed accessors cover the fields
//! the filter needs: `cell_type`, `source` and `outputs`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use nbpress_shared::{NbpressError, Result};

/// Oldest `nbformat` major version with top-level `cells`.
pub const MIN_NBFORMAT: u64 = 4;

const CELLS_KEY: &str = "cells";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A notebook: ordered cells plus arbitrary top-level fields.
///
/// `fields` holds every top-level entry in file order. Its `cells` slot is
/// refilled from `cells` on serialization, so it keeps its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document {
    cells: Vec<Cell>,
    fields: Map<String, Value>,
}

impl Document {
    /// Parse a notebook from its JSON text.
    ///
    /// Fails with a validation error for pre-v4 notebooks and a parse error
    /// for anything that is not a notebook object with a `cells` array.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| NbpressError::parse(format!("invalid notebook JSON: {e}")))?;

        if let Some(major) = value.get("nbformat").and_then(Value::as_u64) {
            if major < MIN_NBFORMAT {
                return Err(NbpressError::validation(format!(
                    "nbformat {major} is not supported, convert the notebook to nbformat {MIN_NBFORMAT} first"
                )));
            }
        }

        serde_json::from_value(value)
            .map_err(|e| NbpressError::parse(format!("invalid notebook structure: {e}")))
    }

    /// Serialize with one-space indentation and a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| NbpressError::parse(format!("failed to serialize notebook: {e}")))?;

        let mut out = String::from_utf8(buf)
            .map_err(|e| NbpressError::parse(format!("serialized notebook is not UTF-8: {e}")))?;
        out.push('\n');
        Ok(out)
    }

    /// Cells in notebook order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Same top-level fields, different cells.
    pub fn with_cells(&self, cells: Vec<Cell>) -> Self {
        Self {
            cells,
            fields: self.fields.clone(),
        }
    }

    /// A top-level field other than `cells`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == CELLS_KEY {
            return None;
        }
        self.fields.get(key)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of code cells.
    pub fn code_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_code()).count()
    }

    /// The `nbformat` major version, if declared.
    pub fn nbformat(&self) -> Option<u64> {
        self.field("nbformat").and_then(Value::as_u64)
    }
}

impl TryFrom<Map<String, Value>> for Document {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let raw = match fields.get_mut(CELLS_KEY) {
            Some(Value::Array(cells)) => std::mem::take(cells),
            Some(_) => return Err("`cells` must be an array".into()),
            None => return Err("missing field `cells`".into()),
        };

        let cells = raw
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(map) => Cell::try_from(map).map_err(|e| format!("cell {i}: {e}")),
                _ => Err(format!("cell {i}: not an object")),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { cells, fields })
    }
}

impl From<Document> for Map<String, Value> {
    fn from(doc: Document) -> Self {
        let mut fields = doc.fields;
        let cells = doc.cells.into_iter().map(|c| Value::Object(c.0)).collect();
        // Replacing an existing key keeps its position.
        fields.insert(CELLS_KEY.to_string(), Value::Array(cells));
        fields
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One notebook cell, stored as its original JSON object.
///
/// Construction checks that `cell_type` is a string and `source` is a
/// string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Cell(Map<String, Value>);

impl Cell {
    pub fn kind(&self) -> CellKind {
        CellKind::from_tag(self.0.get("cell_type").and_then(Value::as_str).unwrap_or_default())
    }

    pub fn is_code(&self) -> bool {
        self.kind() == CellKind::Code
    }

    pub fn source(&self) -> Source {
        self.0
            .get("source")
            .and_then(Source::from_value)
            .unwrap_or_default()
    }

    /// Recorded execution results. Present on code cells only.
    pub fn outputs(&self) -> Option<&[Value]> {
        self.0.get("outputs").and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Any other field (`metadata`, `id`, `execution_count`, ...).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Copy with `source` replaced in place; all other entries untouched.
    pub fn with_source(&self, source: Source) -> Self {
        let mut map = self.0.clone();
        map.insert("source".to_string(), source.to_value());
        Self(map)
    }
}

impl TryFrom<Map<String, Value>> for Cell {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        match map.get("cell_type") {
            Some(Value::String(_)) => {}
            Some(_) => return Err("`cell_type` must be a string".into()),
            None => return Err("missing field `cell_type`".into()),
        }
        match map.get("source") {
            Some(value) if Source::from_value(value).is_some() => {}
            Some(_) => return Err("`source` must be a string or a list of strings".into()),
            None => return Err("missing field `source`".into()),
        }
        Ok(Self(map))
    }
}

impl From<Cell> for Map<String, Value> {
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

/// The `cell_type` tag. Unknown tags are kept verbatim in [`CellKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKind {
    Markdown,
    Code,
    Other(String),
}

impl CellKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "markdown" => Self::Markdown,
            "code" => Self::Code,
            other => Self::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Cell text. nbformat allows a list of lines or one multi-line string;
/// whichever shape was read is written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Source {
    /// The empty line list `[]`.
    pub fn empty() -> Self {
        Self::Lines(Vec::new())
    }

    /// Number of text lines.
    pub fn line_count(&self) -> usize {
        match self {
            Self::Lines(lines) => lines.len(),
            Self::Text(text) => text.lines().count(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::Lines),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Lines(lines) => Value::Array(lines.iter().cloned().map(Value::String).collect()),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::empty()
    }
}
