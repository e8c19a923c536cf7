use crate::domain::news::{NewsSentimentInput, SentimentResult};
use crate::flows::PromptFlow;

pub struct NewsSentimentFlow;

impl PromptFlow for NewsSentimentFlow {
    const NAME: &'static str = "getNewsSentimentFlow";

    type Input = NewsSentimentInput;
    type Output = SentimentResult;

    fn render(input: &NewsSentimentInput) -> String {
        format!(
            "You are a financial sentiment analyst. Analyze the following news headline and \
summary to determine if its sentiment is Positive, Negative, or Neutral for the associated \
company.\n\n\
Headline: {}\n\
Summary: {}\n\n\
Provide your sentiment analysis and a concise, one-sentence reasoning.",
            input.title, input.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headline_and_summary_lines() {
        let prompt = NewsSentimentFlow::render(&NewsSentimentInput {
            title: "Retailer raises guidance".into(),
            summary: "Holiday sales beat expectations.".into(),
        });
        assert!(prompt.contains("Headline: Retailer raises guidance\n"));
        assert!(prompt.contains("Summary: Holiday sales beat expectations.\n"));
    }
}
