use crate::domain::contract::{
    required_text, string_object_schema, Contract, ContractViolation, StructuredOutput,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfoInput {
    pub stock_symbol: String,
}

impl Contract for StockInfoInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            stock_symbol: required_text("stockSymbol", self.stock_symbol)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suggestion {
    Buy,
    Hold,
    Sell,
}

/// Model-generated take on a ticker. Not backed by market data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInfo {
    pub summary: String,
    pub suggestion: Suggestion,
    pub reasoning: String,
}

impl Contract for StockInfo {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            summary: required_text("summary", self.summary)?,
            suggestion: self.suggestion,
            reasoning: required_text("reasoning", self.reasoning)?,
        })
    }
}

impl StructuredOutput for StockInfo {
    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["summary", "suggestion", "reasoning"],
            "properties": {
                "summary": {"type": "string"},
                "suggestion": {"type": "string", "enum": ["BUY", "HOLD", "SELL"]},
                "reasoning": {"type": "string"}
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSuggestionsInput {
    pub trading_history: String,
    pub risk_tolerance: String,
    pub market_conditions: String,
}

impl Contract for TradingSuggestionsInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            trading_history: required_text("tradingHistory", self.trading_history)?,
            risk_tolerance: required_text("riskTolerance", self.risk_tolerance)?,
            market_conditions: required_text("marketConditions", self.market_conditions)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSuggestions {
    pub suggestions: String,
    pub reasoning: String,
}

impl Contract for TradingSuggestions {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            suggestions: required_text("suggestions", self.suggestions)?,
            reasoning: required_text("reasoning", self.reasoning)?,
        })
    }
}

impl StructuredOutput for TradingSuggestions {
    fn json_schema() -> serde_json::Value {
        string_object_schema(&["suggestions", "reasoning"])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrendsInput {
    pub news_summary: String,
}

impl Contract for MarketTrendsInput {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            news_summary: required_text("newsSummary", self.news_summary)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketTrendSummary {
    pub summary: String,
}

impl Contract for MarketTrendSummary {
    fn validated(self) -> Result<Self, ContractViolation> {
        Ok(Self {
            summary: required_text("summary", self.summary)?,
        })
    }
}

impl StructuredOutput for MarketTrendSummary {
    fn json_schema() -> serde_json::Value {
        string_object_schema(&["summary"])
    }
}
