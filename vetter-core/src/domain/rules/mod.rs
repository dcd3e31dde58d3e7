// vetter-core/src/domain/rules/mod.rs

pub mod compiled;
pub mod compiler;
pub mod raw;
pub mod sign;

pub use compiled::{CompiledRule, CompiledRules, Condition, Detail, FieldRef, KeyPair};
pub use compiler::DefinitionCompiler;
pub use raw::{CheckKind, RawDefinitionSet};
pub use sign::{Polarity, Sign};
