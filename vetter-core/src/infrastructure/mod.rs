// vetter-core/src/infrastructure/mod.rs

pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod io;
pub mod run_status;

pub use catalog::YamlCatalog;
pub use io::encoding::LabelEncodingResolver;
pub use run_status::JsonRunStatusRecorder;
