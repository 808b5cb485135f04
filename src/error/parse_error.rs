/// Raw LLM output could not be turned into an action plan.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("plan text is empty after cleanup")]
    Empty,

    #[error("failed to decode action plan: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Text actually handed to the decoder, after fence and comment stripping.
        cleaned: String,
    },
}

impl ParseError {
    pub fn cleaned_text(&self) -> Option<&str> {
        match self {
            ParseError::Empty => None,
            ParseError::Decode { cleaned, .. } => Some(cleaned),
        }
    }
}
