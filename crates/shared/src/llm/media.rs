use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::gateway::{InlineData, ModelResponse};

/// First non-empty inline payload of the first candidate, if any.
pub fn first_inline_data(response: &ModelResponse) -> Option<&InlineData> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
}

pub fn to_data_uri(inline: &InlineData) -> String {
    format!(
        "data:{};base64,{}",
        inline.mime_type,
        STANDARD.encode(&inline.data)
    )
}

/// Encodes the first inline payload as a `data:` URI. `None` means the
/// provider produced no media, which callers treat as a normal outcome.
pub fn first_inline_data_uri(response: &ModelResponse) -> Option<String> {
    first_inline_data(response).map(to_data_uri)
}
