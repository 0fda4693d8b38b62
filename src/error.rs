//! Error taxonomy of the optimization pipeline.
//!
//! No error here is fatal to a page render. Each variant maps to a
//! degradation: the affected tag, batch or stage keeps its original markup.

use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetKind;
use crate::minify::MinifyError;
use crate::registry::StoreError;

/// Pipeline-level errors, reported through the logger.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A tag matched the scanner pattern but its attributes could not be read.
    #[error("cannot parse attributes of `{tag}`")]
    ParseSkip { tag: String },

    /// Reference is not a local file; kept verbatim.
    #[error("`{url}` is external or missing")]
    ExternalOrMissing { url: String },

    /// Whole-document minification failed; content was restored.
    #[error("html minification failed")]
    MinifyFailure(#[source] MinifyError),

    /// The hash registry store rejected a read or write.
    #[error("hash registry unavailable for {kind} batch")]
    Store {
        kind: AssetKind,
        #[source]
        source: StoreError,
    },

    /// A source file of a generated asset could not be read.
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}
