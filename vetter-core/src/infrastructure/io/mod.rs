// vetter-core/src/infrastructure/io/mod.rs
//
// Dataset and report codecs. Everything is decoded to text on read and
// encoded back with the dataset's own encoding on write.

pub mod dataset;
pub mod encoding;
pub mod report;

pub use dataset::{CodecOptions, LineLayout, read_dataset, read_records, write_records};
pub use report::write_report;
