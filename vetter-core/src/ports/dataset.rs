// vetter-core/src/ports/dataset.rs

// What the run needs to know about a stored dataset, without knowing where the
// catalog keeps that knowledge.

use std::path::PathBuf;

use crate::domain::metadata::MetaId;
use crate::domain::record::DataFormat;
use crate::error::VetterError;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetLocation {
    pub dataset_id: String,
    pub path: PathBuf,
    /// Encoding label, resolved through an [`crate::ports::EncodingResolver`].
    pub encoding: String,
    pub format: DataFormat,
    /// Metadata set describing the rows.
    pub meta_id: MetaId,
}

pub trait DatasetLocator: Send + Sync {
    fn resolve(&self, dataset_id: &str) -> Result<DatasetLocation, VetterError>;
}
