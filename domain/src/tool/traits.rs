//! Tool domain traits
//!
//! Contains pure domain logic traits for parameter validation.
//! The async handler port is defined in the application layer (ports).

use super::entities::ToolDefinition;
use super::schema::{FieldSpec, FieldType};
use super::value_objects::{FieldError, ValidatedParams};
use serde_json::{Map, Value};

/// Validator for raw tool parameters
///
/// This is a pure domain trait that validates parameters against a
/// definition's schema without any I/O operations. It must run before any
/// side effect of the tool.
pub trait ToolValidator: Send + Sync {
    /// Validate `params`, returning every field error found.
    fn validate(
        &self,
        params: &Value,
        definition: &ToolDefinition,
    ) -> Result<ValidatedParams, Vec<FieldError>>;
}

/// Default implementation of ToolValidator, driven by the definition's
/// [`ParameterSchema`](super::schema::ParameterSchema).
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl ToolValidator for SchemaValidator {
    fn validate(
        &self,
        params: &Value,
        definition: &ToolDefinition,
    ) -> Result<ValidatedParams, Vec<FieldError>> {
        let empty = Map::new();
        let object = match params {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(vec![FieldError::new(
                    "$",
                    "parameters must be a JSON object",
                )]);
            }
        };

        let schema = &definition.schema;
        let mut errors = Vec::new();
        let mut validated = Map::new();

        for field in schema.fields() {
            match object.get(&field.name) {
                Some(Value::Null) | None => {
                    if let Some(default) = &field.default {
                        validated.insert(field.name.clone(), default.clone());
                    } else if field.required {
                        errors.push(FieldError::new(&field.name, "is required"));
                    }
                }
                Some(value) => match check_field(field, value) {
                    Ok(()) => {
                        validated.insert(field.name.clone(), value.clone());
                    }
                    Err(message) => errors.push(FieldError::new(&field.name, message)),
                },
            }
        }

        for (name, value) in object {
            if schema.field(name).is_some() {
                continue;
            }
            if schema.allows_unknown() {
                validated.insert(name.clone(), value.clone());
            } else {
                errors.push(FieldError::new(name, "is not a known parameter"));
            }
        }

        if errors.is_empty() {
            Ok(ValidatedParams::from_validated(validated))
        } else {
            Err(errors)
        }
    }
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<(), String> {
    if !field.field_type.matches(value) {
        return Err(format!("must be of type {}", field.field_type.as_str()));
    }

    if let FieldType::Enum(allowed) = &field.field_type {
        let candidate = value.as_str().unwrap_or_default();
        if !allowed.iter().any(|a| a == candidate) {
            return Err(format!("must be one of: {}", allowed.join(", ")));
        }
    }

    let rules = &field.rules;
    let length = match value {
        Value::String(s) => {
            if rules.non_empty && s.trim().is_empty() {
                return Err("must not be empty".to_string());
            }
            Some(s.chars().count())
        }
        Value::Array(items) => {
            if rules.non_empty && items.is_empty() {
                return Err("must not be empty".to_string());
            }
            Some(items.len())
        }
        _ => None,
    };

    if let Some(len) = length {
        if let Some(min) = rules.min_length
            && len < min
        {
            return Err(format!("length must be at least {}", min));
        }
        if let Some(max) = rules.max_length
            && len > max
        {
            return Err(format!("length must be at most {}", max));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(minimum) = rules.minimum
            && number < minimum
        {
            return Err(format!("must be >= {}", minimum));
        }
        if let Some(maximum) = rules.maximum
            && number > maximum
        {
            return Err(format!("must be <= {}", maximum));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::RiskLevel;
    use serde_json::json;

    fn mysql_create() -> ToolDefinition {
        ToolDefinition::new("mysql_create", "Create MySQL", RiskLevel::Medium)
            .with_field(FieldSpec::required("name", "Name", FieldType::String).non_empty())
            .with_field(FieldSpec::required("environment_id", "Environment", FieldType::String))
            .with_field(
                FieldSpec::optional("port", "Port", FieldType::Integer)
                    .with_range(1.0, 65535.0),
            )
            .with_field(
                FieldSpec::optional("version", "Version", FieldType::String).with_default("8"),
            )
    }

    #[test]
    fn test_validator_missing_required() {
        let result = SchemaValidator.validate(&json!({"name": "orders"}), &mysql_create());
        let errors = result.unwrap_err();
        assert_eq!(errors, vec![FieldError::new("environment_id", "is required")]);
    }

    #[test]
    fn test_validator_collects_every_error() {
        let result = SchemaValidator.validate(
            &json!({"name": "  ", "port": 70000, "extra": true}),
            &mysql_create(),
        );
        let errors = result.unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "environment_id", "port", "extra"]);
    }

    #[test]
    fn test_validator_wrong_type() {
        let errors = SchemaValidator
            .validate(
                &json!({"name": "orders", "environment_id": "env-1", "port": "3306"}),
                &mysql_create(),
            )
            .unwrap_err();
        assert_eq!(errors[0].message, "must be of type integer");
    }

    #[test]
    fn test_validator_non_object() {
        let errors = SchemaValidator.validate(&json!([1, 2]), &mysql_create()).unwrap_err();
        assert_eq!(errors[0].field, "$");
    }

    #[test]
    fn test_validator_fills_defaults() {
        let params = SchemaValidator
            .validate(
                &json!({"name": "orders", "environment_id": "env-1"}),
                &mysql_create(),
            )
            .unwrap();
        assert_eq!(params.get_str("version"), Some("8"));
        assert!(params.get("port").is_none());
    }

    #[test]
    fn test_validator_enum_membership() {
        let definition = ToolDefinition::new("redirect_create", "Redirect", RiskLevel::Medium)
            .with_field(FieldSpec::required(
                "kind",
                "Kind",
                FieldType::Enum(vec!["permanent".into(), "temporary".into()]),
            ));

        assert!(
            SchemaValidator
                .validate(&json!({"kind": "permanent"}), &definition)
                .is_ok()
        );
        let errors = SchemaValidator
            .validate(&json!({"kind": "sometimes"}), &definition)
            .unwrap_err();
        assert!(errors[0].message.contains("permanent, temporary"));
    }

    #[test]
    fn test_validator_allows_unknown_when_declared() {
        let definition = ToolDefinition::new("compose_update", "Update", RiskLevel::Medium)
            .with_schema(crate::tool::schema::ParameterSchema::new().allowing_unknown());

        let params = SchemaValidator
            .validate(&json!({"anything": 1}), &definition)
            .unwrap();
        assert_eq!(params.get_i64("anything"), Some(1));
    }

    #[test]
    fn test_validator_null_params_as_empty_object() {
        let definition = ToolDefinition::new("project_list", "List", RiskLevel::Low);
        assert!(SchemaValidator.validate(&Value::Null, &definition).is_ok());
    }
}
