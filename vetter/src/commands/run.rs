// vetter/src/commands/run.rs
//
// USE CASE: Check a dataset.

use std::path::PathBuf;
use tracing::debug;

use vetter_core::application::{CheckRequest, CheckServices, run_check};
use vetter_core::domain::ledger::RunStatus;
use vetter_core::infrastructure::{JsonRunStatusRecorder, LabelEncodingResolver};

use super::load_project;

pub fn execute(project_dir: PathBuf, request: CheckRequest) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    let (config, catalog) = load_project(&project_dir)?;
    let target_dir = project_dir.join(&config.target_path);
    debug!(?target_dir, references = ?request.references, "Run configured");

    let services = CheckServices {
        metadata: &catalog,
        rules: &catalog,
        datasets: &catalog,
        encodings: &LabelEncodingResolver,
    };
    let recorder = JsonRunStatusRecorder::new(&target_dir);

    println!(
        "🚀 Checking '{}' with definition set {}...",
        request.target, request.definition_id
    );
    let result = run_check(services, &recorder, &config.check, &target_dir, &request);

    match result {
        Ok(outcome) => {
            println!(
                "📊 {} records checked, {} report entries.",
                outcome.rows_processed,
                outcome.entries.len()
            );
            match outcome.status {
                RunStatus::Completed => {
                    println!("\n✨ SUCCESS! Check finished in {:.2?}", start.elapsed());
                }
                RunStatus::CompletedWithViolations => {
                    println!(
                        "\n⚠️  COMPLETED WITH VIOLATIONS in {:.2?}. See {}",
                        start.elapsed(),
                        outcome.report_path.display()
                    );
                }
                RunStatus::Error => {
                    let reason = outcome
                        .entries
                        .first()
                        .map(|e| e.message.as_str())
                        .unwrap_or_default();
                    eprintln!("\n❌ FAILURE. Run aborted: {}", reason);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL RUN ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
