use crate::domain::error::DomainError;
use crate::domain::rules::raw::RawDefinitionSet;

pub trait RuleRepository: Send + Sync {
    fn rule_definitions(&self, definition_id: i64) -> Result<RawDefinitionSet, DomainError>;
}
