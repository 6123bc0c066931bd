use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{ApiToken, ApiTokenSummary};

/// Input for issuing a new API token
#[derive(Debug, Clone, PartialEq, ToSchema)]
pub struct CreateTokenInput {
    pub name: String,
}

impl CreateTokenInput {
    pub fn from_json(body: &Value) -> Result<Self, String> {
        body.get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| Self { name: n.to_string() })
            .ok_or_else(|| "Name is required and must be a string".to_string())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenCreatedResponse {
    pub success: bool,
    pub data: ApiToken,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenListResponse {
    pub data: Vec<ApiTokenSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_is_trimmed() {
        let input = CreateTokenInput::from_json(&json!({"name": "  laptop agent "})).unwrap();
        assert_eq!(input.name, "laptop agent");
    }

    #[test]
    fn test_blank_or_missing_name_is_rejected() {
        assert!(CreateTokenInput::from_json(&json!({})).is_err());
        assert!(CreateTokenInput::from_json(&json!({"name": "  "})).is_err());
        assert!(CreateTokenInput::from_json(&json!({"name": 7})).is_err());
    }
}
