// vetter/src/commands/mod.rs

pub mod rules;
pub mod run;

use anyhow::Context;
use std::path::Path;

use vetter_core::infrastructure::YamlCatalog;
use vetter_core::infrastructure::config::{ProjectConfig, load_project_config};

/// Project configuration and the catalog it points at.
pub(crate) fn load_project(project_dir: &Path) -> anyhow::Result<(ProjectConfig, YamlCatalog)> {
    println!("⚙️  Loading configuration...");
    let config = load_project_config(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    let catalog_dir = project_dir.join(&config.catalog_path);
    let catalog = YamlCatalog::load(&catalog_dir, project_dir)
        .with_context(|| format!("Failed to load catalog from {:?}", catalog_dir))?;
    Ok((config, catalog))
}
