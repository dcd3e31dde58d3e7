// vetter-core/src/infrastructure/error.rs

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(vetter::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Dataset file not found at {0:?}")]
    #[diagnostic(code(vetter::infra::dataset_missing))]
    DatasetFileNotFound(PathBuf),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(vetter::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(vetter::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(vetter::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Catalog has no {kind} with identifier '{id}'")]
    #[diagnostic(
        code(vetter::infra::catalog_entry),
        help("Check the YAML files under the catalog directory.")
    )]
    CatalogEntryNotFound { kind: &'static str, id: String },

    // --- DATA CODECS ---
    #[error("CSV Error: {0}")]
    #[diagnostic(code(vetter::infra::csv))]
    Csv(#[from] csv::Error),

    #[error("Unknown character encoding '{0}'")]
    #[diagnostic(
        code(vetter::infra::encoding),
        help("Use a WHATWG encoding label such as 'utf-8' or 'shift_jis'.")
    )]
    UnknownEncoding(String),

    #[error("{path:?} is not valid {encoding} text")]
    #[diagnostic(code(vetter::infra::decode))]
    Decode { path: PathBuf, encoding: String },

    #[error("Output for {path:?} contains characters not representable in {encoding}")]
    #[diagnostic(code(vetter::infra::encode))]
    Encode { path: PathBuf, encoding: String },

    #[error("Malformed record at row {row}")]
    #[diagnostic(code(vetter::infra::malformed_record))]
    MalformedRecord { row: usize },
}
