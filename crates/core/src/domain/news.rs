use crate::domain::contract::{
    absolute_url, required_text, Contract, ContractViolation, StructuredOutput,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub title: String,
    pub url: String,
    pub source: String,
    pub summary: String,
    /// Relative, free-text age such as "3h ago".
    pub timestamp: String,
}

impl Contract for NewsHeadline {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            title: required_text("title", self.title)?,
            url: absolute_url("url", self.url)?,
            source: self.source.trim().to_string(),
            summary: self.summary.trim().to_string(),
            timestamp: self.timestamp.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNewsInput {
    pub stock_symbol: String,
}

impl Contract for GetNewsInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            stock_symbol: required_text("stockSymbol", self.stock_symbol)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetNewsOutput {
    pub headlines: Vec<NewsHeadline>,
}

impl GetNewsOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Contract for GetNewsOutput {
    fn validated(self) -> Result<Self, ContractViolation> {
        let mut headlines = Vec::with_capacity(self.headlines.len());
        for (idx, headline) in self.headlines.into_iter().enumerate() {
            let headline = headline.validated().map_err(|v| {
                ContractViolation::new(format!("headlines[{idx}].{}", v.field), v.reason)
            })?;
            headlines.push(headline);
        }
        Ok(Self { headlines })
    }
}

impl StructuredOutput for GetNewsOutput {
    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["headlines"],
            "properties": {
                "headlines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["title", "url", "source", "summary", "timestamp"],
                        "properties": {
                            "title": {"type": "string"},
                            "url": {"type": "string"},
                            "source": {"type": "string"},
                            "summary": {"type": "string"},
                            "timestamp": {"type": "string"}
                        }
                    }
                }
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSentimentInput {
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

impl Contract for NewsSentimentInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            title: required_text("title", self.title)?,
            // Scraped headlines frequently have no summary.
            summary: self.summary.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub reasoning: String,
}

impl Contract for SentimentResult {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            sentiment: self.sentiment,
            reasoning: required_text("reasoning", self.reasoning)?,
        })
    }
}

impl StructuredOutput for SentimentResult {
    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["sentiment", "reasoning"],
            "properties": {
                "sentiment": {"type": "string", "enum": ["Positive", "Negative", "Neutral"]},
                "reasoning": {"type": "string"}
            }
        })
    }
}
