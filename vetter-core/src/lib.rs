// vetter-core/src/lib.rs

#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (I/O collaborators)
// Dataset location, encodings, run bookkeeping.
pub mod ports;

// 2. Domain
// Rule model, definition compiler, sign evaluation, check processors, violation ledger.
// Depends on nothing outside itself.
pub mod domain;

// 3. Infrastructure (Adapters)
// YAML catalog, dataset codecs, encoding lookup, run status file.
pub mod infrastructure;

// 4. Application (Use Cases)
// The check run and the rules listing.
pub mod application;

pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::VetterError;
