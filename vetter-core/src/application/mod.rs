// vetter-core/src/application/mod.rs

pub mod reference_loader;
pub mod rules;
pub mod run;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use vetter_core::application::{run_check, compile_rules, ...};`

pub use reference_loader::ReferenceDatasetLoader;
pub use rules::compile_rules;
pub use run::{CheckOutcome, CheckRequest, CheckServices, run_check};
