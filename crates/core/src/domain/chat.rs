use crate::domain::contract::{
    required_text, string_object_schema, Contract, ContractViolation, StructuredOutput,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatInput {
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub query: String,
    pub stock_context: String,
}

impl Contract for AiChatInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            history: self.history,
            query: required_text("query", self.query)?,
            // May be empty when no symbol is selected.
            stock_context: self.stock_context.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiChatOutput {
    pub response: String,
}

impl Contract for AiChatOutput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            response: required_text("response", self.response)?,
        })
    }
}

impl StructuredOutput for AiChatOutput {
    fn json_schema() -> serde_json::Value {
        string_object_schema(&["response"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_camel_case_input_with_roles() {
        let input: AiChatInput = serde_json::from_value(json!({
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "model", "content": "hello"},
            ],
            "query": "what about NVDA?",
            "stockContext": "NVDA",
        }))
        .unwrap();

        assert_eq!(input.history[1].role, ChatRole::Model);
        assert_eq!(input.stock_context, "NVDA");
    }

    #[test]
    fn rejects_unknown_role() {
        let res = serde_json::from_value::<ChatMessage>(json!({"role": "system", "content": "x"}));
        assert!(res.is_err());
    }

    #[test]
    fn blank_query_is_a_contract_violation() {
        let input = AiChatInput {
            history: vec![],
            query: "   ".into(),
            stock_context: "AAPL".into(),
        };
        assert_eq!(input.validated().unwrap_err().field, "query");
    }
}
