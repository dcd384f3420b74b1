//! Code-source stripping.

use crate::model::{Cell, Document, Source};

/// What [`strip_code_sources`] changed, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Cells in the document.
    pub cells: usize,
    /// Code cells whose source was cleared.
    pub code_cells: usize,
    /// Source lines removed across all code cells.
    pub lines_removed: usize,
}

impl FilterSummary {
    /// Summarize the effect of stripping `doc`.
    pub fn of(doc: &Document) -> Self {
        let (code_cells, lines_removed) = doc
            .cells()
            .iter()
            .filter(|c| c.is_code())
            .fold((0, 0), |(n, lines), c| (n + 1, lines + c.source().line_count()));

        Self {
            cells: doc.cell_count(),
            code_cells,
            lines_removed,
        }
    }
}

/// Return a copy of `doc` with every code cell's source replaced by `[]`.
///
/// Cell order, count, kind, outputs and all other fields are unchanged.
/// Markdown and other cells are copied as-is.
pub fn strip_code_sources(doc: &Document) -> Document {
    doc.with_cells(doc.cells().iter().map(strip_cell).collect())
}

fn strip_cell(cell: &Cell) -> Cell {
    if cell.is_code() {
        cell.with_source(Source::empty())
    } else {
        cell.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::model::CellKind;

    fn doc(cells: Value) -> Document {
        let notebook = json!({
            "cells": cells,
            "metadata": {"language_info": {"name": "python"}},
            "nbformat": 4,
            "nbformat_minor": 5
        });
        serde_json::from_value(notebook).expect("valid notebook")
    }

    fn mixed_doc() -> Document {
        doc(json!([
            {"cell_type": "markdown", "id": "m1", "metadata": {}, "source": ["# Results\n", "Below."]},
            {
                "cell_type": "code",
                "execution_count": 7,
                "id": "c1",
                "metadata": {"tags": ["keep"]},
                "outputs": [{"output_type": "execute_result", "data": {"text/plain": ["3.14"]}}],
                "source": ["import math\n", "math.pi"]
            },
            {"cell_type": "raw", "metadata": {}, "source": ["\\newpage"]},
            {"cell_type": "code", "metadata": {}, "outputs": [], "source": []},
            {"cell_type": "markdown", "metadata": {}, "source": "Done."}
        ]))
    }

    #[test]
    fn title_and_print_scenario() {
        let input = doc(json!([
            {"cell_type": "markdown", "metadata": {}, "source": ["# Title"]},
            {"cell_type": "code", "metadata": {}, "outputs": ["1"], "source": ["print(1)"]}
        ]));

        let out = strip_code_sources(&input);

        assert_eq!(out.cells()[0], input.cells()[0]);
        assert_eq!(out.cells()[1].source(), Source::Lines(vec![]));
        assert_eq!(out.cells()[1].outputs(), Some(&[json!("1")][..]));
        assert_eq!(out.cells()[1].kind(), CellKind::Code);
    }

    #[test]
    fn preserves_order_count_and_non_code_cells() {
        let input = mixed_doc();
        let out = strip_code_sources(&input);

        assert_eq!(out.cell_count(), input.cell_count());
        assert_eq!(out.field("metadata"), input.field("metadata"));

        for (before, after) in input.cells().iter().zip(out.cells()) {
            assert_eq!(before.kind(), after.kind());
            if before.is_code() {
                assert_eq!(after.source(), Source::empty());
                assert_eq!(before.outputs(), after.outputs());
                assert_eq!(before.get("metadata"), after.get("metadata"));
                assert_eq!(before.get("execution_count"), after.get("execution_count"));
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let input = mixed_doc();
        let snapshot = input.clone();
        let _ = strip_code_sources(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn idempotent() {
        let once = strip_code_sources(&mixed_doc());
        let twice = strip_code_sources(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn text_shaped_source_becomes_empty_list() {
        let input = doc(json!([
            {"cell_type": "code", "metadata": {}, "outputs": [], "source": "x = 1\ny = 2\n"}
        ]));

        let out = strip_code_sources(&input);
        assert_eq!(out.cells()[0].source(), Source::Lines(vec![]));
    }

    #[test]
    fn empty_cell_list() {
        let input = doc(json!([]));
        let out = strip_code_sources(&input);
        assert!(out.cells().is_empty());
        assert_eq!(out, input);
        assert_eq!(FilterSummary::of(&input), FilterSummary::default());
    }

    #[test]
    fn summary_counts() {
        let summary = FilterSummary::of(&mixed_doc());
        assert_eq!(
            summary,
            FilterSummary {
                cells: 5,
                code_cells: 2,
                lines_removed: 2,
            }
        );
    }
}
