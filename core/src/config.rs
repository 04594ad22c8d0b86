#![deny(missing_docs)]

//! # Describe Options
//!
//! Application-level settings that feed the inference rules. Usually loaded
//! from a YAML file:
//!
//! ```yaml
//! application_name: inventory
//! default_error_type: ProblemDetails
//! services: [AppState, DbPool]
//! parseable_types: [Slug]
//! ```

use crate::capabilities::{CapabilityCache, RegisteredServices};
use crate::error::{AppError, AppResult};
use crate::signature::TypeDescriptor;
use crate::source::types::parse_type_str;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings shared by every endpoint of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescribeOptions {
    /// Tag used for handlers without a usable declaring type.
    pub application_name: Option<String>,
    /// Error body type used when no `DefaultErrorType` metadata is attached.
    pub default_error_type: Option<String>,
    /// Type names resolved from the service container.
    pub services: Vec<String>,
    /// Extra type names that parse from a single string.
    pub parseable_types: Vec<String>,
}

impl DescribeOptions {
    /// Parses options from YAML.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AppError::General(format!("Failed to parse options YAML: {}", e)))
    }

    /// Reads and parses an options file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// The configured default error type as a descriptor.
    pub fn default_error_descriptor(&self) -> AppResult<Option<TypeDescriptor>> {
        self.default_error_type
            .as_deref()
            .map(parse_type_str)
            .transpose()
    }

    /// Service registry built from `services`.
    pub fn service_registry(&self) -> RegisteredServices {
        RegisteredServices::from_names(self.services.iter().cloned())
    }

    /// Capability cache aware of `parseable_types`.
    pub fn capability_cache(&self) -> CapabilityCache {
        CapabilityCache::with_parseable_types(self.parseable_types.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::TypeShape;

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
application_name: inventory
default_error_type: ProblemDetails
services: [AppState]
"#;
        let opts = DescribeOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(opts.application_name.as_deref(), Some("inventory"));
        assert_eq!(opts.services, vec!["AppState".to_string()]);
        assert!(opts.parseable_types.is_empty());

        let err_ty = opts.default_error_descriptor().unwrap().unwrap();
        assert_eq!(err_ty.name(), "ProblemDetails");
        assert_eq!(err_ty.shape(), &TypeShape::Named);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let opts = DescribeOptions::from_yaml_str("{}").unwrap();
        assert_eq!(opts, DescribeOptions::default());
        assert!(opts.default_error_descriptor().unwrap().is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let res = DescribeOptions::from_yaml_str("app_name: typo");
        assert!(matches!(res, Err(AppError::General(_))));
    }
}
