//! The tenancy boundary carried with every authenticated request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deployment tier of a runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvironmentType {
    Production,
    Staging,
    Development,
    Preview,
}

impl EnvironmentType {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// The security principal: the (environment, project, organization) triple
/// that every downstream operation is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedEnvironment {
    pub environment_id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub environment_slug: String,
    pub api_key: String,
    pub environment_type: EnvironmentType,
    pub project_slug: String,
    pub project_name: String,
    pub org_slug: String,
    pub org_title: String,
}
