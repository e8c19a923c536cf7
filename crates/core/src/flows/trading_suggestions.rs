use crate::domain::market::{TradingSuggestions, TradingSuggestionsInput};
use crate::flows::PromptFlow;

pub struct TradingSuggestionsFlow;

impl PromptFlow for TradingSuggestionsFlow {
    const NAME: &'static str = "generateTradingSuggestionsFlow";

    type Input = TradingSuggestionsInput;
    type Output = TradingSuggestions;

    fn render(input: &TradingSuggestionsInput) -> String {
        format!(
            "You are an AI trading assistant that provides personalized trading suggestions based \
on the user's trading history, risk tolerance, and current market conditions.\n\n\
Trading History: {}\n\
Risk Tolerance: {}\n\
Market Conditions: {}\n\n\
Generate a list of trading suggestions and explain your reasoning. Focus on actionable insights \
and avoid generic advice.",
            input.trading_history, input.risk_tolerance, input.market_conditions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_three_fields() {
        let prompt = TradingSuggestionsFlow::render(&TradingSuggestionsInput {
            trading_history: "Bought QQQ dips".into(),
            risk_tolerance: "Moderate".into(),
            market_conditions: "Rate cuts priced in".into(),
        });
        assert!(prompt.contains("Trading History: Bought QQQ dips\n"));
        assert!(prompt.contains("Risk Tolerance: Moderate\n"));
        assert!(prompt.contains("Market Conditions: Rate cuts priced in\n"));
    }
}
