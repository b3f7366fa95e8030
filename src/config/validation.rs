//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic, including the url type range)
//! - Check alias targets and the default route are well-formed routes
//! - Check separator, index and cipher key are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// True for non-empty `[A-Za-z0-9_]` identifiers.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True for "Controller" or "Controller:action" with identifier parts.
pub fn is_route_target(s: &str) -> bool {
    match s.split_once(':') {
        Some((controller, action)) => is_identifier(controller) && is_identifier(action),
        None => is_identifier(s),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let url = &config.url;

    if url.dot.is_empty() {
        errors.push(ValidationError::new("url.dot", "separator must not be empty"));
    } else if url
        .dot
        .chars()
        .any(|c| c.is_alphanumeric() || matches!(c, '?' | '#' | '%' | '&' | '='))
    {
        errors.push(ValidationError::new(
            "url.dot",
            "separator must not contain alphanumerics or '?', '#', '%', '&', '='",
        ));
    }

    if url.index.is_empty() {
        errors.push(ValidationError::new("url.index", "index filename must not be empty"));
    }

    if !url.default_route.is_empty() && !is_route_target(&url.default_route) {
        errors.push(ValidationError::new(
            "url.default_route",
            format!("`{}` is not a Controller[:action] target", url.default_route),
        ));
    }

    if url.router_addition_params.keys().any(str::is_empty) {
        errors.push(ValidationError::new(
            "url.router_addition_params",
            "parameter names must not be empty",
        ));
    }

    for (alias, target) in &config.router {
        if alias.is_empty() {
            errors.push(ValidationError::new("router", "alias names must not be empty"));
        }
        if !is_route_target(target) {
            errors.push(ValidationError::new(
                format!("router.{alias}"),
                format!("`{target}` is not a Controller[:action] target"),
            ));
        }
    }

    if config.cipher.key.is_empty() {
        errors.push(ValidationError::new("cipher.key", "key must not be empty"));
    }

    for (controller, entry) in &config.controllers {
        if !is_identifier(controller) {
            errors.push(ValidationError::new(
                format!("controllers.{controller}"),
                "controller name must be an identifier",
            ));
        }
        for (action, meta) in &entry.actions {
            let field = format!("controllers.{controller}.actions.{action}");
            if !is_identifier(action) {
                errors.push(ValidationError::new(&field, "action name must be an identifier"));
            }
            let mut seen = HashSet::new();
            for name in &meta.params {
                if !seen.insert(name.as_str()) {
                    errors.push(ValidationError::new(
                        &field,
                        format!("parameter `{name}` declared twice"),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_route_targets() {
        assert!(is_route_target("Main"));
        assert!(is_route_target("Main:index"));
        assert!(!is_route_target("Main:"));
        assert!(!is_route_target(":index"));
        assert!(!is_route_target("Main:a:b"));
        assert!(!is_route_target("Ma-in"));
    }

    #[test]
    fn test_bad_alias_and_key() {
        let mut config = AppConfig::default();
        config.router.insert("home".into(), "Main:".into());
        config.cipher.key.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "router.home");
        assert_eq!(errors[1].field, "cipher.key");
    }

    #[test]
    fn test_duplicate_param_names() {
        let config: AppConfig = toml::from_str(
            "[controllers.Main.actions.show]\nparams = [\"id\", \"id\"]\n",
        )
        .unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`id`"));
    }

    #[test]
    fn test_separator_rules() {
        let mut config = AppConfig::default();
        config.url.dot = "?".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "url.dot");
    }
}
