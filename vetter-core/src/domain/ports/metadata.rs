use crate::domain::error::DomainError;
use crate::domain::metadata::{MetaDataset, MetaId};

pub trait MetadataRepository: Send + Sync {
    /// Field descriptors of a metadata set. Unknown ids are `DomainError::MetadataNotFound`.
    fn field_descriptors(&self, meta_id: MetaId) -> Result<MetaDataset, DomainError>;
}
