use crate::domain::chat::{AiChatInput, AiChatOutput, ChatRole};
use crate::flows::PromptFlow;
use std::fmt::Write as _;

pub struct AiChatFlow;

impl PromptFlow for AiChatFlow {
    const NAME: &'static str = "aiChatFlow";

    type Input = AiChatInput;
    type Output = AiChatOutput;

    fn render(input: &AiChatInput) -> String {
        let mut out = format!(
            "You are VisionTrade's AI assistant, an expert in financial markets and trading. \
You are helpful, friendly, and provide insightful, concise answers. \
The user is currently viewing the stock: {}.\n\n\
Continue the following conversation.\n\n",
            input.stock_context
        );

        for message in &input.history {
            let speaker = match message.role {
                ChatRole::User => "User",
                ChatRole::Model => "Assistant",
            };
            let _ = writeln!(out, "{speaker}: {}", message.content);
        }
        let _ = write!(out, "User: {}\nAssistant:", input.query);
        out
    }
}
