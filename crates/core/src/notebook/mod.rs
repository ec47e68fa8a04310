//! Notebook document model (nbformat v4)

mod document;

pub use document::{
    Cell, CodeCell, MarkupCell, Notebook, Output, SourceText, StreamName, SUPPORTED_NBFORMAT,
};
