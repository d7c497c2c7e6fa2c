const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Strips a markdown code fence the model may wrap around its JSON output.
///
/// A ```` ```json ```` opener is checked before a bare ```` ``` ````. The
/// closing fence is optional. Unfenced text is only trimmed.
pub fn clean_json(text: &str) -> String {
    let trimmed = text.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix(JSON_FENCE) {
        strip_closing_fence(rest)
    } else if let Some(rest) = trimmed.strip_prefix(FENCE) {
        strip_closing_fence(rest)
    } else {
        trimmed
    };

    inner.trim().to_string()
}

fn strip_closing_fence(text: &str) -> &str {
    text.strip_suffix(FENCE).unwrap_or(text)
}
