// vetter-core/src/application/rules.rs
//
// USE CASE: compile a definition set without touching any record, for
// inspection.

use tracing::instrument;

use crate::application::reference_loader::ReferenceDatasetLoader;
use crate::application::run::CheckServices;
use crate::domain::project::CheckConfig;
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::compiler::DefinitionCompiler;
use crate::error::VetterError;

/// Compiles `definition_id` against the metadata of `target`.
///
/// Reference metadata is resolved through `references` exactly as a run
/// would, but no dataset rows are read.
#[instrument(skip(services, config, references))]
pub fn compile_rules(
    services: CheckServices<'_>,
    config: &CheckConfig,
    target: &str,
    definition_id: i64,
    references: &[String],
) -> Result<CompiledRules, VetterError> {
    let location = services.datasets.resolve(target)?;
    let reference_locations = references
        .iter()
        .map(|id| services.datasets.resolve(id))
        .collect::<Result<Vec<_>, _>>()?;

    let meta = services.metadata.field_descriptors(location.meta_id)?;
    let raw = services.rules.rule_definitions(definition_id)?;

    let mut loader = ReferenceDatasetLoader::new(
        reference_locations,
        services.metadata,
        services.encodings,
        config.delimiter,
    );
    let rules = DefinitionCompiler::new(config, &meta, location.format).compile(&raw, &mut loader)?;
    Ok(rules)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::rules::raw::CheckKind;
    use crate::infrastructure::catalog::YamlCatalog;
    use crate::infrastructure::io::encoding::LabelEncodingResolver;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    const CATALOG: &str = r#"
metadata:
  - id: 100
    matters:
      - { id: 1, name: id, position: 1 }
      - { id: 3, name: code, position: 3 }
  - id: 200
    matters:
      - { id: 11, name: town_id, position: 1 }
definitions:
  - id: 5
    target_meta_id: 100
    checks:
      - number: 1
        summary: retired code
        kind: normal
        details:
          - conditions: [{ item: 3, comparison: equal, sign: "05" }]
            error_flag: E1
      - number: 2
        summary: unknown town
        kind: reference
        reference_meta_id: 200
        key_pairs: [{ target_item: 1, reference_item: 11 }]
        details:
          - conditions: [{ item: 1, comparison: equal, sign: "@REF" }]
            error_flag: E2
datasets:
  - { id: survey, path: survey.csv, meta_id: 100 }
  - { id: towns, path: does-not-exist.csv, meta_id: 200 }
"#;

    #[test]
    fn test_compiles_without_reading_rows() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("catalog.yaml"), CATALOG)?;
        let catalog = YamlCatalog::load(dir.path(), dir.path())?;
        let services = CheckServices {
            metadata: &catalog,
            rules: &catalog,
            datasets: &catalog,
            encodings: &LabelEncodingResolver,
        };

        let rules = compile_rules(services, &CheckConfig::default(), "survey", 5, &["towns".to_string()])?;

        assert_eq!(rules.rules.len(), 2);
        assert_eq!(rules.rules[1].kind, CheckKind::Reference);
        assert_eq!(rules.reference_meta_ids(), vec![200]);

        let err = compile_rules(services, &CheckConfig::default(), "survey", 5, &[]).unwrap_err();
        assert!(matches!(err, VetterError::Domain(DomainError::NoReferenceDatasets)));
        Ok(())
    }
}
