// vetter-core/src/domain/mod.rs

pub mod engine;
pub mod error;
pub mod ledger;
pub mod metadata;
pub mod ports;
pub mod project;
pub mod record;
pub mod reference;
pub mod rules;

pub use error::DomainError;
