//! Parameter schemas for tool definitions.
//!
//! A [`ParameterSchema`] is an ordered list of [`FieldSpec`]s. Validation
//! itself lives in [`SchemaValidator`](super::traits::SchemaValidator); this
//! module only describes shapes and renders them as JSON Schema for model
//! tool-use payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Type of a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// A string restricted to the listed values
    Enum(Vec<String>),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String | FieldType::Enum(_) => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Whether `value` has this type (enum membership is checked separately).
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String | FieldType::Enum(_) => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

/// Validation rules attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    /// Minimum length for strings (chars) and arrays (items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length for strings (chars) and arrays (items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Inclusive lower bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Reject strings that are empty after trimming
    pub non_empty: bool,
}

/// Specification of a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub description: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Value filled in when an optional field is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub rules: FieldRules,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            field_type,
            required,
            default: None,
            rules: FieldRules::default(),
        }
    }

    pub fn required(
        name: impl Into<String>,
        description: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self::new(name, description, field_type, true)
    }

    pub fn optional(
        name: impl Into<String>,
        description: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self::new(name, description, field_type, false)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.rules.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.rules.max_length = Some(max);
        self
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.rules.minimum = Some(minimum);
        self.rules.maximum = Some(maximum);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.rules.non_empty = true;
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), json!(self.field_type.as_str()));
        property.insert("description".into(), json!(self.description));
        if let FieldType::Enum(values) = &self.field_type {
            property.insert("enum".into(), json!(values));
        }
        if let Some(default) = &self.default {
            property.insert("default".into(), default.clone());
        }
        let (min_key, max_key) = match self.field_type {
            FieldType::Array => ("minItems", "maxItems"),
            _ => ("minLength", "maxLength"),
        };
        if let Some(min) = self.rules.min_length {
            property.insert(min_key.into(), json!(min));
        } else if self.rules.non_empty {
            property.insert(min_key.into(), json!(1));
        }
        if let Some(max) = self.rules.max_length {
            property.insert(max_key.into(), json!(max));
        }
        if let Some(minimum) = self.rules.minimum {
            property.insert("minimum".into(), json!(minimum));
        }
        if let Some(maximum) = self.rules.maximum {
            property.insert("maximum".into(), json!(maximum));
        }
        Value::Object(property)
    }
}

/// Ordered set of fields accepted by a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    fields: Vec<FieldSpec>,
    /// Accept fields that are not declared
    #[serde(default)]
    allow_unknown: bool,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing an earlier field with the same name.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    pub fn allowing_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Render as a JSON Schema `object`.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self.required_fields().map(|f| f.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": self.allow_unknown,
        })
    }
}
