// vetter-core/src/ports/mod.rs

pub mod dataset;
pub mod encoding;
pub mod run_status;

pub use dataset::{DatasetLocation, DatasetLocator};
pub use encoding::EncodingResolver;
pub use run_status::{OutputDescriptor, RunStatusRecorder};
