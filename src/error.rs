use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MasonryError {
    /// A selector given for the container or the items matched nothing.
    #[error("can't find {what} element for selector `{selector}`")]
    Resolution { what: &'static str, selector: String },

    /// An operation was invoked before the session reached the state it needs.
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    #[error(
        "container width {container_width} leaves room for no column of width {column_width}"
    )]
    DegenerateColumnCount { container_width: f64, column_width: f64 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("I/O error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MasonryError>;
