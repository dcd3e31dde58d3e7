use crate::domain::error::DomainError;
use crate::domain::metadata::MetaId;
use crate::domain::reference::{ReferenceDataset, ReferenceMetadata};

/// Per-run access to reference data, keyed by reference metadata id.
///
/// Both calls load on first use and return the cached value afterwards.
pub trait ReferenceSource {
    fn metadata(&mut self, meta_id: MetaId) -> Result<&ReferenceMetadata, DomainError>;

    fn dataset(&mut self, meta_id: MetaId) -> Result<&mut ReferenceDataset, DomainError>;
}
