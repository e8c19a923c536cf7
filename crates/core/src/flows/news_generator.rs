use crate::domain::news::{GetNewsInput, GetNewsOutput};
use crate::flows::PromptFlow;
use crate::news::MAX_HEADLINES;

/// Fabricates headlines for broad categories ("market", "crypto", ...) that have no page to
/// scrape.
pub struct NewsGeneratorFlow;

impl PromptFlow for NewsGeneratorFlow {
    const NAME: &'static str = "newsGeneratorPrompt";

    type Input = GetNewsInput;
    type Output = GetNewsOutput;

    fn render(input: &GetNewsInput) -> String {
        format!(
            "You are a financial news generator. Create {MAX_HEADLINES} plausible but fictional \
news headlines for the topic: {}.\n\n\
For each headline, provide:\n\
- A compelling title.\n\
- A reputable-sounding financial news source (e.g., \"Reuters\", \"Bloomberg\").\n\
- A very short, one-sentence summary of the article.\n\
- A realistic, relative timestamp (e.g., \"45m ago\", \"3h ago\", \"1d ago\").\n\
- A plausible but fictional URL, for example: \
https://www.marketwatch.com/story/example-story-slug-12345\n\n\
Ensure the headlines cover a mix of topics like earnings, product launches, market sentiment, \
or analyst ratings.",
            input.stock_symbol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asks_for_bounded_batch_on_topic() {
        let prompt = NewsGeneratorFlow::render(&GetNewsInput {
            stock_symbol: "Crypto".into(),
        });
        assert!(prompt.contains("Create 10 plausible"));
        assert!(prompt.contains("for the topic: Crypto."));
    }
}
