// src/domain/ports/mod.rs

pub mod metadata;
pub mod reference;
pub mod rules;

pub use metadata::MetadataRepository;
pub use reference::ReferenceSource;
pub use rules::RuleRepository;
