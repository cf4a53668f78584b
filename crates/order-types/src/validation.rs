//! Configuration validation for pluggable implementations.
//!
//! Every pricing engine and signer implementation describes the TOML table it
//! accepts as a [`Schema`]. The engine builder validates the configured table
//! against it before the implementation is wired into the engine.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// Error that occurs when deserialization fails.
	#[error("Failed to deserialize config: {0}")]
	DeserializationError(String),
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	Boolean,
	/// A decimal number written either as a TOML string ("0.001") or a TOML number.
	Decimal {
		min: Option<Decimal>,
		max: Option<Decimal>,
	},
	/// A nested table with its own schema.
	Table(Schema),
	/// A table whose values all follow the same schema (e.g. keyed by pair address).
	Map(Schema),
}

/// Custom check run after type validation. Returns the error message on failure.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field of a schema.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, path: &str, value: &toml::Value) -> Result<(), ValidationError> {
		validate_field_type(path, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: path.to_string(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Validation schema for a TOML table: required fields plus optional fields.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Fails on the first missing required field, type mismatch or rejected
	/// custom validation. Nested tables report dotted field paths.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		self.validate_at("", config)
	}

	fn validate_at(&self, prefix: &str, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| mismatch(if prefix.is_empty() { "root" } else { prefix }, "table", config))?;

		for field in &self.required {
			let path = join(prefix, &field.name);
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(path.clone()))?;
			field.check(&path, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(&join(prefix, &field.name), value)?;
			}
		}

		Ok(())
	}
}

fn join(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{}.{}", prefix, name)
	}
}

fn mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

/// Reads a decimal from a TOML string or number.
pub fn decimal_from_toml(value: &toml::Value) -> Option<Decimal> {
	match value {
		toml::Value::String(s) => Decimal::from_str(s.trim()).ok(),
		toml::Value::Integer(i) => Some(Decimal::from(*i)),
		toml::Value::Float(f) => Decimal::from_str(&f.to_string()).ok(),
		_ => None,
	}
}

fn validate_field_type(
	path: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(mismatch(path, "string", value));
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(mismatch(path, "boolean", value));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(path, "integer", value))?;
			if min.is_some_and(|min| int_val < min) || max.is_some_and(|max| int_val > max) {
				return Err(ValidationError::InvalidValue {
					field: path.to_string(),
					message: format!("Value {} is out of range [{:?}, {:?}]", int_val, min, max),
				});
			}
		},
		FieldType::Decimal { min, max } => {
			let dec_val = decimal_from_toml(value).ok_or_else(|| mismatch(path, "decimal", value))?;
			if min.is_some_and(|min| dec_val < min) || max.is_some_and(|max| dec_val > max) {
				return Err(ValidationError::InvalidValue {
					field: path.to_string(),
					message: format!("Value {} is out of range [{:?}, {:?}]", dec_val, min, max),
				});
			}
		},
		FieldType::Table(schema) => schema.validate_at(path, value)?,
		FieldType::Map(schema) => {
			let table = value.as_table().ok_or_else(|| mismatch(path, "table", value))?;
			for (key, entry) in table {
				schema.validate_at(&join(path, key), entry)?;
			}
		},
	}

	Ok(())
}

/// A configuration schema that can validate TOML values.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![
				Field::new("url", FieldType::String).with_validator(|v| {
					let url = v.as_str().unwrap_or_default();
					if url.starts_with("http") {
						Ok(())
					} else {
						Err("url must use http or https".to_string())
					}
				}),
				Field::new(
					"fee",
					FieldType::Decimal {
						min: Some(Decimal::ZERO),
						max: Some(Decimal::ONE),
					},
				),
			],
			vec![Field::new(
				"pairs",
				FieldType::Map(Schema::new(
					vec![Field::new("price", FieldType::Decimal { min: None, max: None })],
					vec![],
				)),
			)],
		)
	}

	#[test]
	fn test_valid_config() {
		let config: toml::Value = toml::from_str(
			r#"
url = "http://localhost:8080"
fee = "0.001"
[pairs.abc]
price = 2.5
"#,
		)
		.unwrap();
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn test_missing_and_out_of_range_fields() {
		let config: toml::Value = toml::from_str(r#"url = "http://x""#).unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::MissingField(f)) if f == "fee"
		));

		let config: toml::Value = toml::from_str("url = \"http://x\"\nfee = \"2\"").unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "fee"
		));
	}

	#[test]
	fn test_nested_map_reports_path() {
		let config: toml::Value = toml::from_str(
			r#"
url = "http://x"
fee = 0
[pairs.abc]
price = true
"#,
		)
		.unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(err.to_string().contains("pairs.abc.price"), "got: {}", err);
	}

	#[test]
	fn test_custom_validator() {
		let config: toml::Value = toml::from_str("url = \"ftp://x\"\nfee = 0").unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(err.to_string().contains("http or https"));
	}
}
