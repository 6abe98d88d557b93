use thiserror::Error;

use crate::data::model::DatasetName;

/// Failure while bringing a dataset into memory.
///
/// Either variant is fatal at startup: the dashboard never renders with a
/// partial bundle.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be retrieved from the configured source.
    #[error("failed to retrieve {dataset} ({file}): {source}")]
    Retrieval {
        dataset: DatasetName,
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The retrieved file could not be parsed as tabular data.
    #[error("failed to parse {dataset} ({file}): {message}")]
    Parse {
        dataset: DatasetName,
        file: String,
        message: String,
    },
}
