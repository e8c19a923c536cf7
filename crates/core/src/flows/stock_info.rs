use crate::domain::market::{StockInfo, StockInfoInput};
use crate::flows::PromptFlow;

pub struct StockInfoFlow;

impl PromptFlow for StockInfoFlow {
    const NAME: &'static str = "getStockInfoFlow";

    type Input = StockInfoInput;
    type Output = StockInfo;

    fn render(input: &StockInfoInput) -> String {
        format!(
            "You are an expert financial analyst. Provide a concise analysis for the stock with \
the ticker symbol: {}.\n\n\
Your analysis should include:\n\
1. A brief summary of the company and its recent performance.\n\
2. A clear \"BUY\", \"HOLD\", or \"SELL\" recommendation.\n\
3. A short paragraph explaining the reasoning for your recommendation.\n\n\
Generate a plausible but fictional analysis based on the stock symbol provided. \
Do not use real-time data.",
            input.stock_symbol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_symbol() {
        let prompt = StockInfoFlow::render(&StockInfoInput {
            stock_symbol: "GOOGL".into(),
        });
        assert!(prompt.contains("ticker symbol: GOOGL."));
        assert!(prompt.contains("\"BUY\", \"HOLD\", or \"SELL\""));
    }
}
