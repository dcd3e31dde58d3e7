// vetter-core/src/domain/error.rs
//
// Every variant is a run-stopping condition. The Display text is what lands
// in the violation report as the abort message.

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::metadata::{MatterId, MetaId};

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- DEFINITIONS ---
    #[error("Check definition set {0} was not found")]
    #[diagnostic(code(vetter::domain::definitions_not_found))]
    DefinitionsNotFound(i64),

    #[error("Check definition set {0} contains no checks")]
    #[diagnostic(code(vetter::domain::definitions_empty))]
    EmptyDefinitionSet(i64),

    #[error("Check {rule} has no detail blocks")]
    #[diagnostic(code(vetter::domain::no_details))]
    NoDetails { rule: u32 },

    #[error("Detail {detail} of check {rule} has no active target condition")]
    #[diagnostic(
        code(vetter::domain::no_primary_condition),
        help("Every detail needs at least one condition with a comparison (equal | other).")
    )]
    NoPrimaryCondition { rule: u32, detail: usize },

    #[error("Reference check {rule} does not name a reference metadata set")]
    #[diagnostic(code(vetter::domain::reference_meta_missing))]
    ReferenceMetaMissing { rule: u32 },

    #[error("Reference check {rule} declares no key pairs")]
    #[diagnostic(code(vetter::domain::key_pairs_missing))]
    KeyPairsMissing { rule: u32 },

    #[error("Reference off-code in check {rule} targets field {matter_id}, which is not part of any key pair")]
    #[diagnostic(code(vetter::domain::off_code_key_missing))]
    OffCodeKeyMissing { rule: u32, matter_id: MatterId },

    #[error("Replacement source '{value}' of check {rule} is not a field identifier")]
    #[diagnostic(code(vetter::domain::replacement_source))]
    InvalidReplacementSource { rule: u32, value: String },

    #[error("Check {rule} is a normal check and cannot replace from a reference record")]
    #[diagnostic(code(vetter::domain::replacement_kind))]
    ReferenceSourceInNormalCheck { rule: u32 },

    // --- METADATA ---
    #[error("Metadata set {0} was not found")]
    #[diagnostic(code(vetter::domain::metadata_not_found))]
    MetadataNotFound(MetaId),

    #[error("Field {matter_id} is not defined or has no position in metadata set {meta_id}")]
    #[diagnostic(code(vetter::domain::matter_not_defined))]
    MatterNotDefined { meta_id: MetaId, matter_id: MatterId },

    #[error("Field {matter_id} of metadata set {meta_id} has an invalid {attribute}")]
    #[diagnostic(code(vetter::domain::matter_attribute))]
    InvalidMatterAttribute {
        meta_id: MetaId,
        matter_id: MatterId,
        attribute: &'static str,
    },

    #[error("Field {matter_id} of metadata set {meta_id} has no byte length, required for fixed-width data")]
    #[diagnostic(code(vetter::domain::byte_length_missing))]
    ByteLengthMissing { meta_id: MetaId, matter_id: MatterId },

    // --- REFERENCE DATA ---
    #[error("Reference checks are defined but no reference dataset was supplied")]
    #[diagnostic(code(vetter::domain::no_reference_datasets))]
    NoReferenceDatasets,

    #[error("No reference dataset was supplied for metadata set {0}")]
    #[diagnostic(code(vetter::domain::reference_not_supplied))]
    ReferenceNotSupplied(MetaId),

    #[error("Reference dataset '{0}' is empty")]
    #[diagnostic(code(vetter::domain::reference_empty))]
    EmptyReferenceDataset(String),

    #[error("Reference dataset for metadata set {meta_id} has no column at key position {position}")]
    #[diagnostic(code(vetter::domain::reference_key_column))]
    ReferenceKeyColumnMissing { meta_id: MetaId, position: usize },

    // --- RECORDS ---
    #[error("Dataset '{dataset}' could not be read: {reason}")]
    #[diagnostic(code(vetter::domain::dataset_unreadable))]
    DatasetUnreadable { dataset: String, reason: String },

    #[error("Malformed record at row {row} of dataset '{dataset}'")]
    #[diagnostic(
        code(vetter::domain::malformed_record),
        help("Blank lines and unparsable delimited rows stop the run.")
    )]
    MalformedRecord { dataset: String, row: usize },

    #[error("Field '{name}' (position {position}) is missing in row {row}")]
    #[diagnostic(code(vetter::domain::field_absent))]
    FieldAbsent {
        row: usize,
        position: usize,
        name: String,
    },
}
