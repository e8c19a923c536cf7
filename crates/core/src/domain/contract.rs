use serde::de::DeserializeOwned;
use std::fmt;

/// Boundary check applied to every flow input before templating and to every model output
/// after decoding. Implementations trim free text and return the normalized value.
pub trait Contract: Sized {
    fn validated(self) -> Result<Self, ContractViolation>;
}

/// An output type the model is asked to produce. The schema is what the backend receives as
/// its structured-output contract; `Contract::validated` is still applied after decoding.
pub trait StructuredOutput: Contract + DeserializeOwned {
    fn json_schema() -> serde_json::Value;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub field: String,
    pub reason: String,
}

impl ContractViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid field `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ContractViolation {}

pub(crate) fn required_text(field: &str, value: String) -> Result<String, ContractViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContractViolation::new(field, "must be non-empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn absolute_url(field: &str, value: String) -> Result<String, ContractViolation> {
    let trimmed = required_text(field, value)?;
    match reqwest::Url::parse(&trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed),
        Ok(url) => Err(ContractViolation::new(
            field,
            format!("unsupported URL scheme {:?}", url.scheme()),
        )),
        Err(err) => Err(ContractViolation::new(field, format!("not a valid URL: {err}"))),
    }
}

/// Schema for an object whose listed properties are all required strings.
pub(crate) fn string_object_schema(fields: &[&str]) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|f| (f.to_string(), serde_json::json!({"type": "string"})))
        .collect();

    serde_json::json!({
        "type": "object",
        "required": fields,
        "properties": properties,
    })
}
