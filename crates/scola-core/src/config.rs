//! School (tenant) configuration and login-time detection.
//!
//! A `SchoolDirectory` holds the configuration of every known school;
//! `detect_from_login` resolves which one a signing-in user belongs to.
//! Resolution never silently falls back to a different school's config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::user::UserType;

/// Configuration validation finding (error or warning).
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// User-friendly summary of all errors.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Calendar-relevant feature switches for one school.
///
/// Unknown features default off, except `google_calendar_read_only`: the
/// read-only path is preferred whenever it is not explicitly disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub google_calendar: bool,
    pub google_calendar_read_only: bool,
    pub messaging: bool,
    pub health_records: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            google_calendar: false,
            google_calendar_read_only: true,
            messaging: false,
            health_records: false,
        }
    }
}

/// Google Workspace wiring for one school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key for credential-free read-only calendar access.
    pub api_key: String,

    /// Override of the Calendar API endpoint. Defaults to the public
    /// Google endpoint; set for tests or a proxy.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Branch id -> Google calendar identifier.
    #[serde(default)]
    pub branch_calendars: BTreeMap<String, String>,
}

impl GoogleConfig {
    /// Whether any branch calendar is mapped for read-only access.
    pub fn has_branch_calendars(&self) -> bool {
        !self.branch_calendars.is_empty()
    }
}

/// Configuration of one school tenant.
///
/// Resolved once at login, persisted for the session, re-resolved on
/// branch switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolConfig {
    pub school_id: String,
    pub name: String,

    /// Login username prefixes owned by this school (e.g. "bgs_").
    /// Longest match wins during detection.
    #[serde(default)]
    pub login_prefixes: Vec<String>,

    /// Base URL of the school's REST backend.
    pub api_base_url: String,

    #[serde(default)]
    pub has_google_workspace: bool,

    #[serde(default)]
    pub features: FeatureFlags,

    #[serde(default)]
    pub google: Option<GoogleConfig>,
}

impl SchoolConfig {
    /// Validate this school's configuration.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let field = |name: &str| format!("schools.{}.{}", self.school_id, name);

        if self.school_id.is_empty() {
            result.add_error("schools.school_id", "School id must not be empty");
        }
        if self.name.is_empty() {
            result.add_error(field("name"), "School name must not be empty");
        }

        validate_url(&self.api_base_url, &field("api_base_url"), &mut result);

        if self.has_google_workspace {
            match &self.google {
                None => result.add_error(
                    field("google"),
                    "Google Workspace enabled but google config is missing",
                ),
                Some(google) => {
                    if google.api_key.is_empty() {
                        result.add_error(field("google.api_key"), "API key must not be empty");
                    }
                    if let Some(base) = &google.api_base_url {
                        validate_url(base, &field("google.api_base_url"), &mut result);
                    }
                    if self.features.google_calendar_read_only && !google.has_branch_calendars() {
                        result.add_warning(
                            field("google.branch_calendars"),
                            "Read-only calendar enabled but no branch calendars mapped",
                        );
                    }
                }
            }
        } else if self.features.google_calendar {
            result.add_warning(
                field("features.google_calendar"),
                "Google calendar feature enabled without a Google Workspace",
            );
        }

        result
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

/// Registry of known school tenants.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolDirectory {
    #[serde(rename = "school")]
    schools: Vec<SchoolConfig>,
}

impl SchoolDirectory {
    /// Compiled-in registry used when no directory file is deployed.
    pub fn builtin() -> Self {
        Self {
            schools: vec![SchoolConfig {
                school_id: "demo".to_string(),
                name: "Demo International School".to_string(),
                login_prefixes: vec!["demo_".to_string()],
                api_base_url: "https://demo.scola.example/api".to_string(),
                has_google_workspace: false,
                features: FeatureFlags::default(),
                google: None,
            }],
        }
    }

    /// Load a directory from its TOML representation, validating each school.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let directory: SchoolDirectory =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let mut seen = std::collections::HashSet::new();
        for school in &directory.schools {
            if !seen.insert(school.school_id.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate school id: {}",
                    school.school_id
                )));
            }
            let validation = school.validate();
            if !validation.is_valid() {
                return Err(ConfigError::Invalid(validation.error_summary()));
            }
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok(directory)
    }

    pub fn schools(&self) -> &[SchoolConfig] {
        &self.schools
    }

    /// Resolve which school a signing-in user belongs to.
    ///
    /// The username is matched against each school's login prefixes;
    /// the longest matching prefix wins. Fails with
    /// [`ConfigError::SchoolNotFound`] when nothing matches — a login must
    /// never proceed against a guessed tenant.
    pub fn detect_from_login(
        &self,
        username: &str,
        user_type: UserType,
    ) -> Result<SchoolConfig, ConfigError> {
        let needle = username.trim().to_lowercase();

        let mut best: Option<(&SchoolConfig, usize)> = None;
        for school in &self.schools {
            for prefix in &school.login_prefixes {
                if needle.starts_with(&prefix.to_lowercase()) {
                    let len = prefix.len();
                    if best.map_or(true, |(_, best_len)| len > best_len) {
                        best = Some((school, len));
                    }
                }
            }
        }

        match best {
            Some((school, _)) => {
                tracing::info!(
                    school = %school.school_id,
                    user_type = user_type.as_str(),
                    "Resolved school from login"
                );
                Ok(school.clone())
            }
            None => Err(ConfigError::SchoolNotFound(username.to_string())),
        }
    }
}
