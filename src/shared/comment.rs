//! Comment text rules

use crate::shared::error::SharedError;

/// Longest accepted comment
pub const COMMENT_MAX_LEN: usize = 250;

/// Validate comment text: 1 to `COMMENT_MAX_LEN` characters after trimming
pub fn validate_comment_text(text: &str) -> Result<String, SharedError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SharedError::validation("text", "Comment text cannot be empty"));
    }
    if text.chars().count() > COMMENT_MAX_LEN {
        return Err(SharedError::validation(
            "text",
            format!("Comment must be at most {} characters", COMMENT_MAX_LEN),
        ));
    }
    Ok(text.to_string())
}
