//! Deployment request/response models

use serde::{Deserialize, Serialize};

use crate::deploy::manifest::Framework;
use crate::errors::SkiffError;

/// A deployment request received over the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// Repository URL to clone
    pub repo_url: Option<String>,

    /// Repository name, used in the workspace path
    pub repo_name: Option<String>,

    /// Access token for private repositories
    pub access_token: Option<String>,
}

impl DeployRequest {
    /// Validate required fields before any side effect occurs.
    ///
    /// Missing or empty `repoUrl`/`repoName` fails fast with the exact
    /// message the API returns.
    pub fn validate(&self) -> Result<(String, String), SkiffError> {
        match (self.repo_url.as_deref(), self.repo_name.as_deref()) {
            (Some(url), Some(name)) if !url.is_empty() && !name.is_empty() => {
                Ok((url.to_string(), name.to_string()))
            }
            _ => Err(SkiffError::ValidationError(
                "Missing repoUrl or repoName".to_string(),
            )),
        }
    }

    /// Access token, treating an empty string as absent
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// The outcome of a successful deployment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub success: bool,

    /// Full pipeline transcript
    pub log: String,

    /// Reachable URL of the deployed application
    pub url: String,

    /// Detected framework identifier
    pub framework: Framework,

    /// Registry id for later inspection or teardown
    pub deployment_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_fields() {
        let request = DeployRequest {
            repo_url: Some("https://github.com/org/repo".to_string()),
            repo_name: None,
            access_token: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let request = DeployRequest {
            repo_url: Some("".to_string()),
            repo_name: Some("repo".to_string()),
            access_token: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let request = DeployRequest {
            repo_url: Some("u".to_string()),
            repo_name: Some("n".to_string()),
            access_token: Some("".to_string()),
        };
        assert!(request.token().is_none());
    }
}
