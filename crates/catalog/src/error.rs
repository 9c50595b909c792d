use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("source '{source_name}' is not valid delimited text: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("dataset json could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to fetch source '{source_name}': {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    #[error("dataset json must be an array of records")]
    NotAnArray,

    #[error("no dataset sources configured")]
    NoSources,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
