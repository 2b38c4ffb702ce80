//! Item normalization strategies.
//!
//! A [`Normalizer`] maps one raw action or message to a comparable
//! canonical form. Returning `None` drops the item: it is never appended
//! to history and never counts as a step.

/// Canonicalizes raw items before they enter a scorer's history.
///
/// Implementations must be total and deterministic: any input string maps
/// to a value (or a drop) without failing, and normalizing an
/// already-normalized string is a no-op.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> Option<String>;
}

/// Coarse action-type fingerprint: the first whitespace-delimited token of
/// the trimmed, lowercased item.
///
/// Empty and whitespace-only items are dropped so they never count as
/// steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureNormalizer;

impl Normalizer for SignatureNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        let lowered = raw.trim().to_lowercase();
        lowered.split_whitespace().next().map(str::to_string)
    }
}

/// Lowercased text with runs of whitespace (spaces, tabs, newlines)
/// collapsed to single spaces, for similarity comparison.
///
/// Empty input yields an empty string rather than a drop; the similarity
/// metric owns the empty-text conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl Normalizer for TextNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        let collapsed = raw
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_takes_first_token() {
        let n = SignatureNormalizer;
        assert_eq!(n.normalize("Search the web for rust"), Some("search".to_string()));
        assert_eq!(n.normalize("  CLICK button#submit  "), Some("click".to_string()));
    }

    #[test]
    fn test_signature_drops_empty_and_whitespace() {
        let n = SignatureNormalizer;
        assert_eq!(n.normalize(""), None);
        assert_eq!(n.normalize("   \t\n  "), None);
    }

    #[test]
    fn test_signature_idempotent() {
        let n = SignatureNormalizer;
        let once = n.normalize("Fetch https://example.com").unwrap();
        assert_eq!(n.normalize(&once), Some(once.clone()));
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let n = TextNormalizer;
        assert_eq!(
            n.normalize("Ship  it\n\tnow\r\nplease"),
            Some("ship it now please".to_string())
        );
    }

    #[test]
    fn test_text_keeps_empty_as_empty() {
        let n = TextNormalizer;
        assert_eq!(n.normalize(""), Some(String::new()));
        assert_eq!(n.normalize("  \n "), Some(String::new()));
    }

    #[test]
    fn test_text_idempotent() {
        let n = TextNormalizer;
        let once = n.normalize("Hello   WORLD\nagain").unwrap();
        assert_eq!(n.normalize(&once), Some(once.clone()));
    }
}
