//! Notebook model and the code-source filter.
//!
//! Reads an nbformat-4 notebook, clears the `source` of every code cell while
//! keeping outputs, markdown and every other field, and writes the result.

pub mod filter;
pub mod model;

use std::path::Path;

use tracing::{debug, info, instrument};

use nbpress_shared::{NbpressError, Result};

pub use filter::{FilterSummary, strip_code_sources};
pub use model::{Cell, CellKind, Document, MIN_NBFORMAT, Source};

/// Read and parse a notebook file.
pub fn read_notebook(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => NbpressError::not_found(path),
        _ => NbpressError::io(path, e),
    })?;

    let doc = Document::from_json_str(&content)?;
    debug!(path = %path.display(), cells = doc.cell_count(), nbformat = ?doc.nbformat(), "read notebook");
    Ok(doc)
}

/// Write a notebook atomically (temp file beside the target, then rename).
pub fn write_notebook(path: &Path, doc: &Document) -> Result<()> {
    let content = doc.to_json_string()?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| NbpressError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| NbpressError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| NbpressError::io(path, e))?;

    debug!(path = %path.display(), cells = doc.cell_count(), "wrote notebook");
    Ok(())
}

/// Read `input`, strip code sources, and write the result to `output`.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn filter_notebook(input: &Path, output: &Path) -> Result<FilterSummary> {
    let doc = read_notebook(input)?;
    let summary = FilterSummary::of(&doc);

    let filtered = strip_code_sources(&doc);
    write_notebook(output, &filtered)?;

    info!(
        cells = summary.cells,
        code_cells = summary.code_cells,
        lines_removed = summary.lines_removed,
        "stripped code sources"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::Value;
    use uuid::Uuid;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbpress-notebook-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    const SAMPLE: &str = r##"{
 "cells": [
  {"cell_type": "markdown", "metadata": {}, "source": ["# Title"]},
  {"cell_type": "code", "execution_count": 1, "metadata": {}, "outputs": [{"output_type": "stream", "name": "stdout", "text": ["1"]}], "source": ["print(1)"]}
 ],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 5
}"##;

    #[test]
    fn filter_notebook_writes_stripped_copy() {
        let dir = temp_dir();
        let input = dir.join("pipeline2.ipynb");
        let output = dir.join("pipeline2_filtered.ipynb");
        std::fs::write(&input, SAMPLE).unwrap();

        let summary = filter_notebook(&input, &output).unwrap();
        assert_eq!(summary.cells, 2);
        assert_eq!(summary.code_cells, 1);

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["cells"][0]["source"][0], "# Title");
        assert_eq!(written["cells"][1]["source"], Value::Array(vec![]));
        assert_eq!(written["cells"][1]["outputs"][0]["text"][0], "1");

        // Input untouched, no temp file left behind.
        assert_eq!(std::fs::read_to_string(&input).unwrap(), SAMPLE);
        assert!(!dir.join(".pipeline2_filtered.ipynb.tmp").exists());
    }

    #[test]
    fn filtered_file_differs_only_in_code_source() {
        let dir = temp_dir();
        let input = dir.join("formatted.ipynb");
        let output = dir.join("formatted_filtered.ipynb");
        let markdown = "  {\n   \"cell_type\": \"markdown\",\n   \"id\": \"a1\",\n   \"metadata\": {},\n   \"source\": [\n    \"# Title\"\n   ]\n  },\n";
        let code_head = "  {\n   \"cell_type\": \"code\",\n   \"execution_count\": 1,\n   \"id\": \"b2\",\n   \"metadata\": {},\n   \"outputs\": [\n    {\n     \"data\": {\n      \"application/json\": {\n       \"n\": 123456789012345678901234567890\n      }\n     },\n     \"output_type\": \"execute_result\"\n    }\n   ],\n";
        let tail = "  }\n ],\n \"metadata\": {},\n \"nbformat\": 4,\n \"nbformat_minor\": 5\n}\n";
        let source_before = "   \"source\": [\n    \"big()\"\n   ]\n";
        let source_after = "   \"source\": []\n";

        std::fs::write(
            &input,
            format!("{{\n \"cells\": [\n{markdown}{code_head}{source_before}{tail}"),
        )
        .unwrap();

        filter_notebook(&input, &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            format!("{{\n \"cells\": [\n{markdown}{code_head}{source_after}{tail}")
        );
    }

    #[test]
    fn missing_input_is_not_found_and_writes_nothing() {
        let dir = temp_dir();
        let input = dir.join("absent.ipynb");
        let output = dir.join("absent_filtered.ipynb");

        let err = filter_notebook(&input, &output).unwrap_err();
        assert!(matches!(err, NbpressError::NotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let dir = temp_dir();
        let input = dir.join("broken.ipynb");
        let output = dir.join("broken_filtered.ipynb");
        std::fs::write(&input, "not json").unwrap();

        assert!(filter_notebook(&input, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn empty_cells_roundtrip_through_files() {
        let dir = temp_dir();
        let input = dir.join("empty.ipynb");
        let output = dir.join("empty_filtered.ipynb");
        std::fs::write(&input, r#"{"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#)
            .unwrap();

        filter_notebook(&input, &output).unwrap();
        let doc = read_notebook(&output).unwrap();
        assert!(doc.cells().is_empty());
        assert_eq!(doc.nbformat(), Some(4));
    }

    #[test]
    fn filtering_filtered_file_is_identical() {
        let dir = temp_dir();
        let input = dir.join("a.ipynb");
        let once = dir.join("b.ipynb");
        let twice = dir.join("c.ipynb");
        std::fs::write(&input, SAMPLE).unwrap();

        filter_notebook(&input, &once).unwrap();
        filter_notebook(&once, &twice).unwrap();

        assert_eq!(
            std::fs::read_to_string(&once).unwrap(),
            std::fs::read_to_string(&twice).unwrap()
        );
    }
}
