// vetter-core/src/application/run.rs
//
// USE CASE: check a target dataset against a definition set, write the
// rewritten dataset and the violation report.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::application::reference_loader::{ReferenceDatasetLoader, dataset_error};
use crate::domain::engine::CheckEngine;
use crate::domain::error::DomainError;
use crate::domain::ledger::{RunStatus, ViolationEntry, ViolationLedger};
use crate::domain::ports::{MetadataRepository, RuleRepository};
use crate::domain::project::CheckConfig;
use crate::domain::record::{DataFormat, Record};
use crate::domain::rules::compiled::CompiledRules;
use crate::domain::rules::compiler::DefinitionCompiler;
use crate::error::VetterError;
use crate::infrastructure::fs::output_file_name;
use crate::infrastructure::io::{CodecOptions, LineLayout, read_dataset, write_records, write_report};
use crate::ports::{
    DatasetLocation, DatasetLocator, EncodingResolver, OutputDescriptor, RunStatusRecorder,
};

/// The collaborators a check run reads from.
#[derive(Clone, Copy)]
pub struct CheckServices<'a> {
    pub metadata: &'a dyn MetadataRepository,
    pub rules: &'a dyn RuleRepository,
    pub datasets: &'a dyn DatasetLocator,
    pub encodings: &'a dyn EncodingResolver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    /// Dataset id of the target.
    pub target: String,
    pub definition_id: i64,
    /// Dataset ids of the reference datasets.
    pub references: Vec<String>,
    /// Output dataset name, `<target>_checked` when absent.
    pub output: Option<String>,
    /// Report name, `<target>_violations` when absent.
    pub report: Option<String>,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub status: RunStatus,
    pub rows_processed: usize,
    pub entries: Vec<ViolationEntry>,
    /// `None` when the run aborted and the dataset was not written.
    pub output_path: Option<PathBuf>,
    pub report_path: PathBuf,
}

// Everything that has to succeed before the first record is checked.
struct Prepared {
    rules: CompiledRules,
    records: Vec<Record>,
    options: CodecOptions,
}

/// Runs one check and records its start and end through `recorder`.
///
/// Fatal domain conditions end up as the single abort entry of the report.
/// Failures that prevent writing the report (configuration, I/O) are
/// returned as errors after the run is marked as failed.
#[instrument(skip_all, fields(target = %request.target, definition = request.definition_id))]
pub fn run_check(
    services: CheckServices<'_>,
    recorder: &dyn RunStatusRecorder,
    config: &CheckConfig,
    target_dir: &Path,
    request: &CheckRequest,
) -> Result<CheckOutcome, VetterError> {
    recorder.mark_started(&request.target)?;

    match execute(services, config, target_dir, request) {
        Ok((outcome, outputs)) => {
            recorder.mark_ended(outcome.status, &outputs)?;
            Ok(outcome)
        }
        Err(err) => {
            if let Err(record_err) = recorder.mark_ended(RunStatus::Error, &[]) {
                warn!(error = %record_err, "Could not record the failed run");
            }
            Err(err)
        }
    }
}

fn execute(
    services: CheckServices<'_>,
    config: &CheckConfig,
    target_dir: &Path,
    request: &CheckRequest,
) -> Result<(CheckOutcome, Vec<OutputDescriptor>), VetterError> {
    fs::create_dir_all(target_dir)?;

    println!("📦 Resolving datasets...");
    let target = services.datasets.resolve(&request.target)?;
    let references = request
        .references
        .iter()
        .map(|id| services.datasets.resolve(id))
        .collect::<Result<Vec<_>, _>>()?;

    let target_encoding = services.encodings.encoding_for(&target.encoding)?;
    let report_encoding = services.encodings.encoding_for(&config.report_encoding)?;

    let output_name = request
        .output
        .clone()
        .unwrap_or_else(|| format!("{}_checked", request.target));
    let report_name = request
        .report
        .clone()
        .unwrap_or_else(|| format!("{}_violations", request.target));
    let output_path = target_dir.join(output_file_name(
        &output_name,
        target.format,
        &config.default_csv_extension,
    ));
    let report_path = target_dir.join(output_file_name(
        &report_name,
        DataFormat::Csv,
        &config.default_csv_extension,
    ));

    let mut loader = ReferenceDatasetLoader::new(
        references,
        services.metadata,
        services.encodings,
        config.delimiter,
    );
    let mut ledger = ViolationLedger::new();

    println!("🧠 Compiling check definitions...");
    let prepared = prepare(services, config, request, &target, target_encoding, &mut loader);

    let (rows_processed, written) = match prepared {
        Ok(mut prepared) => {
            println!("🟢 Checking {} records...", prepared.records.len());
            let engine = CheckEngine::new(&prepared.rules);
            let rows = engine.process(&mut prepared.records, &mut loader, &mut ledger);
            (rows, Some(prepared))
        }
        Err(err) => {
            warn!(error = %err, "Run aborted before the first record");
            ledger.abort(err.to_string());
            (0, None)
        }
    };

    let status = RunStatus::assess(&ledger, rows_processed);
    let mut outputs = Vec::new();

    let output_path = match written {
        Some(prepared) if !ledger.is_aborted() => {
            write_records(&output_path, &prepared.records, target_encoding, &prepared.options)?;
            println!("    ✅ Dataset written: {}", output_path.display());
            outputs.push(OutputDescriptor {
                kind: "dataset".into(),
                path: output_path.clone(),
                rows: prepared.records.len(),
            });
            Some(output_path)
        }
        _ => None,
    };

    write_report(&report_path, ledger.entries(), report_encoding, config.delimiter)?;
    println!("    📝 Report written: {} ({} entries)", report_path.display(), ledger.len());
    outputs.push(OutputDescriptor {
        kind: "report".into(),
        path: report_path.clone(),
        rows: ledger.len(),
    });

    info!(%status, rows = rows_processed, entries = ledger.len(), "Check run finished");

    let outcome = CheckOutcome {
        status,
        rows_processed,
        entries: ledger.entries().to_vec(),
        output_path,
        report_path,
    };
    Ok((outcome, outputs))
}

fn prepare(
    services: CheckServices<'_>,
    config: &CheckConfig,
    request: &CheckRequest,
    target: &DatasetLocation,
    target_encoding: &'static encoding_rs::Encoding,
    loader: &mut ReferenceDatasetLoader<'_>,
) -> Result<Prepared, DomainError> {
    let meta = services.metadata.field_descriptors(target.meta_id)?;
    let raw = services.rules.rule_definitions(request.definition_id)?;
    if raw.target_meta_id != target.meta_id {
        warn!(
            definitions = raw.target_meta_id,
            dataset = target.meta_id,
            "Definition set was written for another metadata set"
        );
    }

    let rules = DefinitionCompiler::new(config, &meta, target.format).compile(&raw, &mut *loader)?;
    loader.preload(&rules.reference_meta_ids())?;

    let mut options = CodecOptions {
        format: target.format,
        delimiter: config.delimiter,
        quote: meta.quote_mark,
        lines: LineLayout::default(),
    };
    let dataset = read_dataset(&target.path, target_encoding, &options)
        .map_err(|e| dataset_error(&target.dataset_id, e))?;
    // Written back with the terminators it was read with.
    options.lines = dataset.lines;

    Ok(Prepared {
        rules,
        records: dataset.records,
        options,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::catalog::YamlCatalog;
    use crate::infrastructure::io::encoding::LabelEncodingResolver;
    use crate::infrastructure::run_status::JsonRunStatusRecorder;
    use anyhow::Result;
    use tempfile::{TempDir, tempdir};

    const CATALOG: &str = r#"
metadata:
  - id: 100
    name: survey
    matters:
      - { id: 1, name: id, position: 1 }
      - { id: 2, name: name, position: 2 }
      - { id: 3, name: code, position: 3 }
  - id: 200
    name: towns
    matters:
      - { id: 11, name: town_id, position: 1 }
      - { id: 12, name: town_code, position: 2 }
definitions:
  - id: 1
    target_meta_id: 100
    checks:
      - number: 1
        summary: code 05 is retired
        kind: normal
        details:
          - conditions: [{ item: 3, comparison: equal, sign: "05" }]
            replacements: [{ item: 3, source: constant, value: "00" }]
            error_flag: ERR1
  - id: 2
    target_meta_id: 100
    checks:
      - number: 1
        summary: code from towns
        kind: reference
        reference_meta_id: 200
        key_pairs: [{ target_item: 1, reference_item: 11 }]
        details:
          - conditions: [{ item: 3, comparison: equal, sign: "99" }]
            replacements: [{ item: 3, source: reference, value: 12 }]
            error_flag: REF
datasets:
  - { id: survey, path: data/survey.csv, meta_id: 100 }
  - { id: towns, path: data/towns.csv, meta_id: 200 }
"#;

    struct Fixture {
        dir: TempDir,
        catalog: YamlCatalog,
    }

    impl Fixture {
        fn new(survey: &str) -> Result<Self> {
            let dir = tempdir()?;
            fs::create_dir_all(dir.path().join("catalog"))?;
            fs::create_dir_all(dir.path().join("data"))?;
            fs::write(dir.path().join("catalog/catalog.yaml"), CATALOG)?;
            fs::write(dir.path().join("data/survey.csv"), survey)?;
            fs::write(dir.path().join("data/towns.csv"), "001,17\n002,42\n")?;
            let catalog = YamlCatalog::load(&dir.path().join("catalog"), dir.path())?;
            Ok(Self { dir, catalog })
        }

        fn target_dir(&self) -> PathBuf {
            self.dir.path().join("target")
        }

        fn run(&self, definition_id: i64, references: &[&str]) -> Result<CheckOutcome> {
            let services = CheckServices {
                metadata: &self.catalog,
                rules: &self.catalog,
                datasets: &self.catalog,
                encodings: &LabelEncodingResolver,
            };
            let recorder = JsonRunStatusRecorder::new(&self.target_dir());
            let request = CheckRequest {
                target: "survey".into(),
                definition_id,
                references: references.iter().map(|r| r.to_string()).collect(),
                output: None,
                report: None,
            };
            Ok(run_check(
                services,
                &recorder,
                &CheckConfig::default(),
                &self.target_dir(),
                &request,
            )?)
        }
    }

    #[test]
    fn test_normal_run_writes_dataset_and_report() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n002,DEF,07\n")?;

        let outcome = fixture.run(1, &[])?;

        assert_eq!(outcome.status, RunStatus::CompletedWithViolations);
        assert_eq!(outcome.rows_processed, 2);
        let output = outcome.output_path.unwrap();
        assert_eq!(output, fixture.target_dir().join("survey_checked.csv"));
        assert_eq!(fs::read_to_string(output)?, "001,ABC,00\n002,DEF,07\n");

        assert_eq!(outcome.report_path, fixture.target_dir().join("survey_violations.csv"));
        let report = fs::read_to_string(&outcome.report_path)?;
        assert_eq!(report.lines().count(), 2);
        assert!(report.lines().nth(1).unwrap().starts_with("1,code 05 is retired,1,3,code,05,00,ERR1"));

        let status: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(fixture.target_dir().join("run_status.json"))?)?;
        assert_eq!(status["state"]["finished"], "completed_with_violations");
        Ok(())
    }

    #[test]
    fn test_clean_run_is_completed() -> Result<()> {
        let fixture = Fixture::new("001,ABC,06\n")?;
        let outcome = fixture.run(1, &[])?;
        assert_eq!(outcome.status, RunStatus::Completed);
        assert!(outcome.entries.is_empty());
        Ok(())
    }

    #[test]
    fn test_reference_run_replaces_from_matched_record() -> Result<()> {
        let fixture = Fixture::new("002,ABC,99\n")?;
        let outcome = fixture.run(2, &["towns"])?;

        assert_eq!(outcome.status, RunStatus::CompletedWithViolations);
        let written = fs::read_to_string(outcome.output_path.unwrap())?;
        assert_eq!(written, "002,ABC,42\n");
        assert_eq!(outcome.entries[0].replacement_value, "42");
        assert_eq!(outcome.entries[0].error_flag, "REF");
        Ok(())
    }

    #[test]
    fn test_abort_before_first_record_is_an_error() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n")?;

        let outcome = fixture.run(2, &[])?;

        assert_eq!(outcome.status, RunStatus::Error);
        assert_eq!(outcome.rows_processed, 0);
        assert!(outcome.output_path.is_none());
        assert!(!fixture.target_dir().join("survey_checked.csv").exists());
        assert_eq!(
            outcome.entries,
            vec![ViolationEntry::abort(
                "Reference checks are defined but no reference dataset was supplied"
            )]
        );
        Ok(())
    }

    #[test]
    fn test_abort_after_progress_keeps_only_the_report() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n002,DEF\n003,GHI,05\n")?;
        let outcome = fixture.run(1, &[])?;

        assert_eq!(outcome.status, RunStatus::CompletedWithViolations);
        assert_eq!(outcome.rows_processed, 1);
        assert!(outcome.output_path.is_none());
        assert!(!fixture.target_dir().join("survey_checked.csv").exists());
        assert_eq!(
            outcome.entries,
            vec![ViolationEntry::abort("Field 'code' (position 3) is missing in row 2")]
        );

        let report = fs::read_to_string(&outcome.report_path)?;
        assert_eq!(report.lines().count(), 2);
        let status: serde_json::Value = serde_json::from_str(&fs::read_to_string(
            fixture.target_dir().join("run_status.json"),
        )?)?;
        assert_eq!(status["state"]["finished"], "completed_with_violations");
        assert_eq!(status["outputs"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_crlf_target_is_written_back_with_crlf() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\r\n002,DEF,07\r\n")?;
        let outcome = fixture.run(1, &[])?;

        let written = fs::read_to_string(outcome.output_path.unwrap())?;
        assert_eq!(written, "001,ABC,00\r\n002,DEF,07\r\n");
        Ok(())
    }

    #[test]
    fn test_malformed_target_aborts() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n\n003,GHI,05\n")?;
        let outcome = fixture.run(1, &[])?;

        assert_eq!(outcome.status, RunStatus::Error);
        assert_eq!(
            outcome.entries[0].message,
            "Malformed record at row 2 of dataset 'survey'"
        );
        Ok(())
    }

    #[test]
    fn test_unknown_target_is_a_failure() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n")?;
        let services = CheckServices {
            metadata: &fixture.catalog,
            rules: &fixture.catalog,
            datasets: &fixture.catalog,
            encodings: &LabelEncodingResolver,
        };
        let recorder = JsonRunStatusRecorder::new(&fixture.target_dir());
        let request = CheckRequest {
            target: "unknown".into(),
            definition_id: 1,
            references: vec![],
            output: None,
            report: None,
        };

        let result = run_check(services, &recorder, &CheckConfig::default(), &fixture.target_dir(), &request);
        assert!(result.is_err());

        let status: serde_json::Value = serde_json::from_str(&fs::read_to_string(recorder.path())?)?;
        assert_eq!(status["state"]["finished"], "error");
        Ok(())
    }

    #[test]
    fn test_rerun_overwrites_outputs_identically() -> Result<()> {
        let fixture = Fixture::new("001,ABC,05\n002,DEF,05\n")?;

        let first = fixture.run(1, &[])?;
        let dataset = fs::read(first.output_path.as_ref().unwrap())?;
        let report = fs::read(&first.report_path)?;

        let second = fixture.run(1, &[])?;
        assert_eq!(fs::read(second.output_path.as_ref().unwrap())?, dataset);
        assert_eq!(fs::read(&second.report_path)?, report);
        assert_eq!(first.entries, second.entries);
        Ok(())
    }
}
