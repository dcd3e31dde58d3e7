// vetter-core/src/application/reference_loader.rs
//
// Per-run reference data. Supplied reference datasets are indexed by the
// metadata set that describes them; metadata and rows are loaded on first
// use and kept until the run ends.

use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::metadata::MetaId;
use crate::domain::ports::{MetadataRepository, ReferenceSource};
use crate::domain::reference::{ReferenceDataset, ReferenceMetadata};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::io::{CodecOptions, LineLayout, read_records};
use crate::ports::{DatasetLocation, EncodingResolver};

pub struct ReferenceDatasetLoader<'a> {
    metadata_repo: &'a dyn MetadataRepository,
    encodings: &'a dyn EncodingResolver,
    delimiter: char,
    supplied: HashMap<MetaId, DatasetLocation>,
    metadata: HashMap<MetaId, ReferenceMetadata>,
    datasets: HashMap<MetaId, ReferenceDataset>,
}

impl<'a> ReferenceDatasetLoader<'a> {
    pub fn new(
        locations: Vec<DatasetLocation>,
        metadata_repo: &'a dyn MetadataRepository,
        encodings: &'a dyn EncodingResolver,
        delimiter: char,
    ) -> Self {
        let mut supplied: HashMap<MetaId, DatasetLocation> = HashMap::new();
        for location in locations {
            if let Some(kept) = supplied.get(&location.meta_id) {
                warn!(
                    dataset = %location.dataset_id,
                    kept = %kept.dataset_id,
                    meta_id = location.meta_id,
                    "Two reference datasets share a metadata set, the first one is used"
                );
                continue;
            }
            supplied.insert(location.meta_id, location);
        }

        Self {
            metadata_repo,
            encodings,
            delimiter,
            supplied,
            metadata: HashMap::new(),
            datasets: HashMap::new(),
        }
    }

    fn location(&self, meta_id: MetaId) -> Result<&DatasetLocation, DomainError> {
        if self.supplied.is_empty() {
            return Err(DomainError::NoReferenceDatasets);
        }
        self.supplied
            .get(&meta_id)
            .ok_or(DomainError::ReferenceNotSupplied(meta_id))
    }

    /// Loads every dataset in `meta_ids` up front, so an empty or unreadable
    /// reference stops the run before the first record.
    #[instrument(skip(self))]
    pub fn preload(&mut self, meta_ids: &[MetaId]) -> Result<(), DomainError> {
        for &meta_id in meta_ids {
            let rows = self.dataset(meta_id)?.len();
            debug!(meta_id, rows, "Reference dataset ready");
        }

        for location in self.supplied.values() {
            if !meta_ids.contains(&location.meta_id) {
                warn!(dataset = %location.dataset_id, "Reference dataset is not used by any check");
            }
        }
        Ok(())
    }

    fn load_rows(&self, meta_id: MetaId) -> Result<ReferenceDataset, DomainError> {
        let location = self.location(meta_id)?;
        let reference = self
            .metadata
            .get(&meta_id)
            .ok_or(DomainError::MetadataNotFound(meta_id))?;

        let encoding = self
            .encodings
            .encoding_for(&location.encoding)
            .map_err(|e| DomainError::DatasetUnreadable {
                dataset: location.dataset_id.clone(),
                reason: e.to_string(),
            })?;
        let options = CodecOptions {
            format: location.format,
            delimiter: self.delimiter,
            quote: reference.meta.quote_mark,
            lines: LineLayout::default(),
        };

        let rows = read_records(&location.path, encoding, &options)
            .map_err(|e| dataset_error(&location.dataset_id, e))?;
        info!(dataset = %location.dataset_id, rows = rows.len(), "Reference dataset loaded");

        ReferenceDataset::new(meta_id, location.dataset_id.clone(), rows)
    }
}

impl ReferenceSource for ReferenceDatasetLoader<'_> {
    fn metadata(&mut self, meta_id: MetaId) -> Result<&ReferenceMetadata, DomainError> {
        if !self.metadata.contains_key(&meta_id) {
            let format = self.location(meta_id)?.format;
            let meta = self.metadata_repo.field_descriptors(meta_id)?;
            debug!(meta_id, fields = meta.matters.len(), "Reference metadata loaded");
            self.metadata.insert(meta_id, ReferenceMetadata { meta, format });
        }
        self.metadata
            .get(&meta_id)
            .ok_or(DomainError::MetadataNotFound(meta_id))
    }

    fn dataset(&mut self, meta_id: MetaId) -> Result<&mut ReferenceDataset, DomainError> {
        if !self.datasets.contains_key(&meta_id) {
            self.metadata(meta_id)?;
            let dataset = self.load_rows(meta_id)?;
            self.datasets.insert(meta_id, dataset);
        }
        self.datasets
            .get_mut(&meta_id)
            .ok_or(DomainError::ReferenceNotSupplied(meta_id))
    }
}

/// Maps a read failure of `dataset` onto the abort it causes.
pub(crate) fn dataset_error(dataset: &str, err: InfrastructureError) -> DomainError {
    match err {
        InfrastructureError::MalformedRecord { row } => DomainError::MalformedRecord {
            dataset: dataset.to_string(),
            row,
        },
        other => DomainError::DatasetUnreadable {
            dataset: dataset.to_string(),
            reason: other.to_string(),
        },
    }
}
