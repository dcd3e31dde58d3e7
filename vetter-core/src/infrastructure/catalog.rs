// vetter-core/src/infrastructure/catalog.rs
//
// YAML-backed metadata, definition and dataset store. Every *.yaml / *.yml
// file under the catalog directory may carry any of the three sections.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::domain::error::DomainError;
use crate::domain::metadata::{MetaDataset, MetaId};
use crate::domain::ports::{MetadataRepository, RuleRepository};
use crate::domain::record::DataFormat;
use crate::domain::rules::raw::RawDefinitionSet;
use crate::error::VetterError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::{DatasetLocation, DatasetLocator};

const CATALOG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatasetEntry {
    pub id: String,
    pub path: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub format: DataFormat,
    pub meta_id: MetaId,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

#[derive(Debug, Deserialize, Default)]
struct CatalogFile {
    #[serde(default)]
    metadata: Vec<MetaDataset>,
    #[serde(default)]
    definitions: Vec<RawDefinitionSet>,
    #[serde(default)]
    datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Default)]
pub struct YamlCatalog {
    base_dir: PathBuf,
    metadata: HashMap<MetaId, MetaDataset>,
    definitions: HashMap<i64, RawDefinitionSet>,
    datasets: HashMap<String, DatasetEntry>,
}

impl YamlCatalog {
    /// Loads every catalog file below `catalog_dir`. Relative dataset paths
    /// are resolved against `base_dir`.
    #[instrument(skip_all, fields(catalog = ?catalog_dir))]
    pub fn load(catalog_dir: &Path, base_dir: &Path) -> Result<Self, InfrastructureError> {
        if !catalog_dir.is_dir() {
            return Err(InfrastructureError::ConfigError(format!(
                "Catalog directory {:?} does not exist",
                catalog_dir
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(catalog_dir).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file()
                && let Some(ext) = path.extension().and_then(|s| s.to_str())
                && CATALOG_EXTENSIONS.contains(&ext)
            {
                files.push(path.to_path_buf());
            }
        }
        // Stable merge order regardless of directory iteration order.
        files.sort();

        let mut catalog = YamlCatalog {
            base_dir: base_dir.to_path_buf(),
            ..Default::default()
        };
        for path in &files {
            let content = fs::read_to_string(path)?;
            let file: CatalogFile = serde_yaml::from_str(&content)?;
            debug!(path = ?path, "Catalog file parsed");
            catalog.merge(file, path)?;
        }

        info!(
            files = files.len(),
            metadata = catalog.metadata.len(),
            definitions = catalog.definitions.len(),
            datasets = catalog.datasets.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    fn merge(&mut self, file: CatalogFile, path: &Path) -> Result<(), InfrastructureError> {
        let duplicate = |kind: &str, id: String| {
            InfrastructureError::ConfigError(format!("Duplicate {} '{}' in {:?}", kind, id, path))
        };

        for meta in file.metadata {
            if self.metadata.contains_key(&meta.id) {
                return Err(duplicate("metadata set", meta.id.to_string()));
            }
            self.metadata.insert(meta.id, meta);
        }
        for definition in file.definitions {
            if self.definitions.contains_key(&definition.id) {
                return Err(duplicate("definition set", definition.id.to_string()));
            }
            self.definitions.insert(definition.id, definition);
        }
        for dataset in file.datasets {
            if self.datasets.contains_key(&dataset.id) {
                return Err(duplicate("dataset", dataset.id.clone()));
            }
            self.datasets.insert(dataset.id.clone(), dataset);
        }
        Ok(())
    }

    pub fn definition_ids(&self) -> Vec<i64> {
        let mut ids: Vec<_> = self.definitions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl MetadataRepository for YamlCatalog {
    fn field_descriptors(&self, meta_id: MetaId) -> Result<MetaDataset, DomainError> {
        self.metadata
            .get(&meta_id)
            .cloned()
            .ok_or(DomainError::MetadataNotFound(meta_id))
    }
}

impl RuleRepository for YamlCatalog {
    fn rule_definitions(&self, definition_id: i64) -> Result<RawDefinitionSet, DomainError> {
        self.definitions
            .get(&definition_id)
            .cloned()
            .ok_or(DomainError::DefinitionsNotFound(definition_id))
    }
}

impl DatasetLocator for YamlCatalog {
    fn resolve(&self, dataset_id: &str) -> Result<DatasetLocation, VetterError> {
        let entry = self
            .datasets
            .get(dataset_id)
            .ok_or_else(|| InfrastructureError::CatalogEntryNotFound {
                kind: "dataset",
                id: dataset_id.to_string(),
            })?;

        let path = Path::new(&entry.path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };

        Ok(DatasetLocation {
            dataset_id: entry.id.clone(),
            path,
            encoding: entry.encoding.clone(),
            format: entry.format,
            meta_id: entry.meta_id,
        })
    }
}
