//! Photo metadata rules: descriptions and tags

use crate::shared::error::SharedError;

/// A photo never carries more distinct tags than this
pub const MAX_TAGS_PER_PHOTO: usize = 5;
/// Longest accepted tag name
pub const TAG_MAX_LEN: usize = 50;
/// Longest accepted photo description
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// Normalize and validate a single tag name
///
/// Surrounding whitespace is dropped. Empty names and names longer than
/// `TAG_MAX_LEN` characters are rejected.
pub fn normalize_tag(raw: &str) -> Result<String, SharedError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SharedError::validation("tags", "Tag name cannot be empty"));
    }
    if name.chars().count() > TAG_MAX_LEN {
        return Err(SharedError::validation(
            "tags",
            format!("Tag name must be at most {} characters", TAG_MAX_LEN),
        ));
    }
    Ok(name.to_string())
}

/// Parse a comma-separated tag list as sent with an upload
///
/// Blank entries are skipped and duplicates collapse onto their first
/// occurrence. More than `MAX_TAGS_PER_PHOTO` distinct names is an error.
///
/// # Example
///
/// ```rust
/// use imagehub::shared::photo::parse_tags;
///
/// let tags = parse_tags("sunset, beach,,sunset").unwrap();
/// assert_eq!(tags, vec!["sunset".to_string(), "beach".to_string()]);
/// ```
pub fn parse_tags(raw: &str) -> Result<Vec<String>, SharedError> {
    let mut tags: Vec<String> = Vec::new();
    for part in raw.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let name = normalize_tag(part)?;
        if !tags.contains(&name) {
            tags.push(name);
        }
    }
    if tags.len() > MAX_TAGS_PER_PHOTO {
        return Err(SharedError::validation(
            "tags",
            format!("A photo can have at most {} tags", MAX_TAGS_PER_PHOTO),
        ));
    }
    Ok(tags)
}

/// Trim a description; blank becomes `None`
pub fn normalize_description(raw: Option<&str>) -> Result<Option<String>, SharedError> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(SharedError::validation(
            "description",
            format!("Description must be at most {} characters", DESCRIPTION_MAX_LEN),
        ));
    }
    Ok(Some(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_skips_blanks_and_duplicates() {
        let tags = parse_tags(" a ,b,, a,c ").unwrap();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tags_limit() {
        assert_eq!(parse_tags("1,2,3,4,5").unwrap().len(), 5);
        let err = parse_tags("1,2,3,4,5,6").unwrap_err();
        assert_eq!(err.field(), "tags");
        // duplicates do not count against the limit
        assert_eq!(parse_tags("1,2,3,4,5,5").unwrap().len(), 5);
    }

    #[test]
    fn test_parse_tags_empty_input() {
        assert!(parse_tags("").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_tag_length() {
        assert!(normalize_tag(&"t".repeat(50)).is_ok());
        assert!(normalize_tag(&"t".repeat(51)).is_err());
        assert!(normalize_tag("   ").is_err());
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(None).unwrap(), None);
        assert_eq!(normalize_description(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_description(Some(" hello ")).unwrap(),
            Some("hello".to_string())
        );
        assert!(normalize_description(Some(&"d".repeat(256))).is_err());
    }
}
