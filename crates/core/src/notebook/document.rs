use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The only notebook format major version the driver understands.
pub const SUPPORTED_NBFORMAT: u32 = 4;

/// An on-disk notebook document: an ordered list of cells plus document
/// metadata and a format-version marker.
///
/// Cell order is execution order. The driver never reorders, skips, or
/// deduplicates cells. Unknown fields (e.g. the cell `id` introduced in
/// nbformat 4.5) are preserved through `extra` so that a load followed by a
/// save does not mutate the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Read and validate a notebook file.
    ///
    /// Any failure here - missing file, unreadable bytes, malformed JSON,
    /// wrong structure, unsupported format version - is a document format
    /// error; the run never starts.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::DocumentFormat(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let notebook: Notebook = serde_json::from_str(contents)
            .map_err(|e| Error::DocumentFormat(format!("malformed notebook: {e}")))?;

        if notebook.nbformat != SUPPORTED_NBFORMAT {
            return Err(Error::DocumentFormat(format!(
                "unsupported nbformat {} (expected {SUPPORTED_NBFORMAT})",
                notebook.nbformat
            )));
        }

        Ok(notebook)
    }

    /// Serialize the document back to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::DocumentFormat(format!("cannot serialize notebook: {e}")))
    }

    /// Persist the document. Whether to call this after a run is the
    /// caller's decision; the driver itself never writes.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = self.to_json_string()?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn code_cell_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Code(_)))
            .count()
    }
}

/// One notebook cell, tagged by `cell_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum Cell {
    Code(CodeCell),
    Markdown(MarkupCell),
    Raw(MarkupCell),
}

impl Cell {
    pub fn source(&self) -> &SourceText {
        match self {
            Cell::Code(cell) => &cell.source,
            Cell::Markdown(cell) | Cell::Raw(cell) => &cell.source,
        }
    }
}

/// An executable cell: source plus, after execution, captured outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    pub source: SourceText,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub execution_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A non-executable cell (markdown or raw). Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupCell {
    pub source: SourceText,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cell source or stream text. nbformat stores these either as one string
/// or as a list of line fragments; both forms are accepted and preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceText {
    Joined(String),
    Lines(Vec<String>),
}

impl SourceText {
    /// The source as a single string, joining line fragments if needed.
    pub fn as_joined(&self) -> String {
        match self {
            SourceText::Joined(text) => text.clone(),
            SourceText::Lines(lines) => lines.concat(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SourceText::Joined(text) => text.is_empty(),
            SourceText::Lines(lines) => lines.iter().all(|l| l.is_empty()),
        }
    }
}

impl Default for SourceText {
    fn default() -> Self {
        SourceText::Joined(String::new())
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        SourceText::Joined(text.to_string())
    }
}

/// A captured cell output, tagged by `output_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: StreamName,
        text: SourceText,
    },
    ExecuteResult {
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        execution_count: Option<u64>,
    },
    DisplayData {
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Stdout,
    Stderr,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r##"{
        "cells": [
            {"cell_type": "markdown", "source": "# Training run", "metadata": {}},
            {"cell_type": "code", "source": ["import os\n", "print(os.getcwd())"],
             "metadata": {}, "outputs": [], "execution_count": null}
        ],
        "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
        "nbformat": 4,
        "nbformat_minor": 5
    }"##;

    #[test]
    fn test_parse_minimal_notebook() {
        let nb = Notebook::from_json_str(MINIMAL).unwrap();
        assert_eq!(nb.cell_count(), 2);
        assert_eq!(nb.code_cell_count(), 1);
        assert_eq!(nb.nbformat, 4);
        assert_eq!(
            nb.cells[1].source().as_joined(),
            "import os\nprint(os.getcwd())"
        );
    }

    #[test]
    fn test_rejects_unsupported_format_version() {
        let err = Notebook::from_json_str(
            r#"{"cells": [], "metadata": {}, "nbformat": 3, "nbformat_minor": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DocumentFormat(_)));
    }

    #[test]
    fn test_rejects_malformed_structure() {
        assert!(matches!(
            Notebook::from_json_str("{\"cells\": 42}"),
            Err(Error::DocumentFormat(_))
        ));
        assert!(matches!(
            Notebook::from_json_str("not json at all"),
            Err(Error::DocumentFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_document_format_error() {
        let err = Notebook::from_path("/no/such/notebook.ipynb").unwrap_err();
        assert!(matches!(err, Error::DocumentFormat(_)));
    }

    #[test]
    fn test_load_does_not_mutate_round_trip() {
        let loaded = Notebook::from_json_str(MINIMAL).unwrap();
        let reserialized = loaded.to_json_string().unwrap();
        let reloaded = Notebook::from_json_str(&reserialized).unwrap();
        assert_eq!(loaded, reloaded);
    }

    #[test]
    fn test_unknown_cell_fields_survive_round_trip() {
        // nbformat 4.5 adds a per-cell "id"; it must not be dropped.
        let raw = r#"{
            "cells": [{"cell_type": "code", "id": "abc123", "source": "1 + 1",
                       "metadata": {}, "outputs": [], "execution_count": null}],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        }"#;
        let nb = Notebook::from_json_str(raw).unwrap();
        let json = nb.to_json_string().unwrap();
        assert!(json.contains("abc123"));
    }

    #[test]
    fn test_output_variants_round_trip() {
        let raw = r#"{
            "cells": [{"cell_type": "code", "source": "x", "metadata": {},
                       "execution_count": 1,
                       "outputs": [
                           {"output_type": "stream", "name": "stdout", "text": "hi\n"},
                           {"output_type": "execute_result",
                            "data": {"text/plain": "2"}, "metadata": {}, "execution_count": 1},
                           {"output_type": "error", "ename": "ValueError",
                            "evalue": "bad", "traceback": ["Traceback..."]}
                       ]}],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 4
        }"#;
        let nb = Notebook::from_json_str(raw).unwrap();
        let Cell::Code(cell) = &nb.cells[0] else {
            panic!("expected code cell");
        };
        assert_eq!(cell.outputs.len(), 3);
        assert!(matches!(
            cell.outputs[0],
            Output::Stream {
                name: StreamName::Stdout,
                ..
            }
        ));
        assert!(matches!(cell.outputs[2], Output::Error { .. }));

        let reloaded = Notebook::from_json_str(&nb.to_json_string().unwrap()).unwrap();
        assert_eq!(nb, reloaded);
    }

    #[test]
    fn test_save_to_path() {
        let nb = Notebook::from_json_str(MINIMAL).unwrap();
        let file = NamedTempFile::new().unwrap();
        nb.save_to_path(file.path()).unwrap();
        let reloaded = Notebook::from_path(file.path()).unwrap();
        assert_eq!(nb, reloaded);
    }

    #[test]
    fn test_from_path_reads_written_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{MINIMAL}").unwrap();
        let nb = Notebook::from_path(file.path()).unwrap();
        assert_eq!(nb.cell_count(), 2);
    }
}
