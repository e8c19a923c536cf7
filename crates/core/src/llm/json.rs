use serde_json::Value;

/// Pulls a JSON object out of free model text: bare, inside a Markdown fence, or wrapped in
/// prose. `None` when nothing object-shaped parses.
pub fn parse_object(text: &str) -> Option<Value> {
    let text = text.trim();
    let body = fenced_body(text).unwrap_or(text);

    as_object(body).or_else(|| brace_span(body).and_then(as_object))
}

fn as_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

/// Interior of a ```` ```json ... ``` ```` block; the info string on the opening line is ignored.
fn fenced_body(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let (_, inner) = rest.split_once('\n')?;
    let inner = match inner.rfind("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    Some(inner.trim())
}

/// First `{` through last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_fenced_answer() {
        let text = "```json\n{\"response\": \"Hi\"}\n```\n";
        assert_eq!(parse_object(text), Some(json!({"response": "Hi"})));
    }

    #[test]
    fn reads_prose_wrapped_answer() {
        let text = "Here you go:\n{\"sentiment\": \"Positive\", \"reasoning\": \"beat\"}\nThanks";
        assert_eq!(
            parse_object(text),
            Some(json!({"sentiment": "Positive", "reasoning": "beat"}))
        );
    }

    #[test]
    fn reads_unterminated_fence() {
        assert_eq!(
            parse_object("```\n{\"summary\": \"flat\"}"),
            Some(json!({"summary": "flat"}))
        );
    }

    #[test]
    fn rejects_non_objects_and_garbage() {
        assert_eq!(parse_object("no json here"), None);
        assert_eq!(parse_object("{not: valid}"), None);
        assert_eq!(parse_object("```\n[1, 2]\n```"), None);
        assert_eq!(parse_object("} backwards {"), None);
    }
}
