// vetter/src/commands/rules.rs
//
// USE CASE: List the compiled checks of a definition set.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::path::PathBuf;

use vetter_core::VetterError;
use vetter_core::application::{CheckServices, compile_rules};
use vetter_core::domain::error::DomainError;
use vetter_core::domain::rules::compiled::{CompiledRule, Detail};
use vetter_core::domain::rules::raw::CheckKind;
use vetter_core::infrastructure::LabelEncodingResolver;

use super::load_project;

pub fn execute(
    project_dir: PathBuf,
    definition: i64,
    target: String,
    references: Vec<String>,
) -> anyhow::Result<()> {
    let (config, catalog) = load_project(&project_dir)?;
    let services = CheckServices {
        metadata: &catalog,
        rules: &catalog,
        datasets: &catalog,
        encodings: &LabelEncodingResolver,
    };

    println!("🧠 Compiling definition set {}...", definition);
    let rules = match compile_rules(services, &config.check, &target, definition, &references) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("❌ Compilation failed: {}", e);
            if let VetterError::Domain(DomainError::DefinitionsNotFound(_)) = e {
                let known: Vec<String> = catalog.definition_ids().iter().map(i64::to_string).collect();
                eprintln!("   Known definition sets: {}", known.join(", "));
            }
            std::process::exit(1);
        }
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("#"),
            header_cell("Kind"),
            header_cell("Summary"),
            header_cell("Details"),
            header_cell("Reference"),
        ]);

    for rule in &rules.rules {
        table.add_row(vec![
            Cell::new(rule.number).set_alignment(CellAlignment::Right),
            Cell::new(kind_label(rule)),
            Cell::new(&rule.summary),
            Cell::new(describe_details(&rule.details)),
            Cell::new(
                rule.reference_meta_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{table}");
    println!(
        "📋 {} checks compiled for metadata set {} ({}).",
        rules.rules.len(),
        rules.target_meta_id,
        rules.target_format.as_str()
    );
    Ok(())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn kind_label(rule: &CompiledRule) -> &'static str {
    match rule.kind {
        CheckKind::Normal => "normal",
        CheckKind::Reference => "reference",
    }
}

// One line per detail: primary field, then what it rewrites or flags.
fn describe_details(details: &[Detail]) -> String {
    details
        .iter()
        .map(|detail| {
            let targets: Vec<&str> = detail
                .replacements
                .iter()
                .map(|r| r.target.name.as_str())
                .collect();
            let action = if targets.is_empty() {
                "flag".to_string()
            } else {
                format!("rewrite {}", targets.join(", "))
            };
            match &detail.error_flag {
                Some(flag) => format!("{} → {} [{}]", detail.primary.field.name, action, flag),
                None => format!("{} → {}", detail.primary.field.name, action),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
