//! Presentation and folder identifiers from sharing URLs.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for the `/d/{id}` segment of a document URL.
static PRESENTATION_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap());

/// Regex for the `/folders/{id}` segment of a Drive folder URL.
static FOLDER_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/folders/([a-zA-Z0-9_-]+)").unwrap());

/// Regex for an `id={id}` query parameter.
static ID_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").unwrap());

/// Regex for a bare identifier.
static BARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Extract the presentation id from a sharing URL or accept a bare id.
pub fn extract_presentation_id(url_or_id: &str) -> Result<String> {
    let input = url_or_id.trim();
    if let Some(caps) = PRESENTATION_ID_REGEX.captures(input) {
        return Ok(caps[1].to_string());
    }
    if BARE_ID_REGEX.is_match(input) {
        return Ok(input.to_string());
    }
    Err(Error::MalformedUrl(url_or_id.to_string()))
}

/// Extract a Drive folder id from a folder URL, an `id=` link, or a bare id.
///
/// Returns `None` when nothing usable is found; the copy then lands in the
/// caller's root folder.
pub fn extract_folder_id(url_or_id: &str) -> Option<String> {
    let input = url_or_id.trim();
    if input.is_empty() {
        return None;
    }

    FOLDER_PATH_REGEX
        .captures(input)
        .or_else(|| ID_PARAM_REGEX.captures(input))
        .map(|caps| caps[1].to_string())
        .or_else(|| BARE_ID_REGEX.is_match(input).then(|| input.to_string()))
}

/// User-facing edit URL for a presentation.
pub fn presentation_url(presentation_id: &str) -> String {
    format!("https://docs.google.com/presentation/d/{}/edit", presentation_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_id_from_url() {
        assert_eq!(
            extract_presentation_id(
                "https://docs.google.com/presentation/d/1AbC-d_E9/edit#slide=id.p"
            )
            .unwrap(),
            "1AbC-d_E9"
        );
        assert_eq!(extract_presentation_id(" 1AbC ").unwrap(), "1AbC");
    }

    #[test]
    fn test_malformed_presentation_url() {
        let err = extract_presentation_id("https://docs.google.com/presentation/").unwrap_err();
        assert!(matches!(err, Error::MalformedUrl(_)));
        assert!(extract_presentation_id("").is_err());
    }

    #[test]
    fn test_folder_id_variants() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/F0ld-er?usp=sharing"),
            Some("F0ld-er".to_string())
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/open?id=XYZ_1"),
            Some("XYZ_1".to_string())
        );
        assert_eq!(extract_folder_id("abc123"), Some("abc123".to_string()));
        assert_eq!(extract_folder_id("not a folder"), None);
        assert_eq!(extract_folder_id(""), None);
    }

    #[test]
    fn test_presentation_url_round_trips() {
        let url = presentation_url("xyz");
        assert_eq!(extract_presentation_id(&url).unwrap(), "xyz");
    }
}
