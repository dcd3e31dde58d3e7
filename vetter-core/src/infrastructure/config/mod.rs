pub mod project;

pub use crate::domain::project::{CheckConfig, ProjectConfig};
pub use project::load_project_config;
