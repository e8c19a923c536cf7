use crate::domain::market::{MarketTrendSummary, MarketTrendsInput};
use crate::flows::PromptFlow;

pub struct MarketTrendsFlow;

impl PromptFlow for MarketTrendsFlow {
    const NAME: &'static str = "summarizeMarketTrendsFlow";

    type Input = MarketTrendsInput;
    type Output = MarketTrendSummary;

    fn render(input: &MarketTrendsInput) -> String {
        format!(
            "You are an AI assistant providing concise summaries of market trends for traders.\n\n\
Given the following news summary, provide a brief overview of the current market situation and \
potential impacts on trading decisions:\n\n\
News Summary:\n{}\n",
            input.news_summary
        )
    }
}
