//! Query text parsing and sanitization.

use crate::config::SearchConfig;

/// Characters stripped from query text before it reaches the store.
const UNSAFE_CHARS: [char; 6] = ['<', '>', '&', '\'', '"', '`'];

/// Normalizes and bounds raw query strings.
///
/// Parsing is purely defensive: it trims, enforces length bounds, and strips
/// characters that are unsafe for downstream text matching. It never changes
/// relevance semantics.
#[derive(Debug, Clone)]
pub struct QueryParser {
    min_len: usize,
    max_len: usize,
}

impl QueryParser {
    /// Create a parser from the engine configuration.
    pub fn new(config: &SearchConfig) -> Self {
        QueryParser {
            min_len: config.min_query_len,
            max_len: config.max_query_len,
        }
    }

    /// Parse a raw query string.
    ///
    /// Returns `None` when the trimmed text is shorter than the minimum
    /// length; otherwise the sanitized text, truncated to the maximum length.
    pub fn parse(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < self.min_len {
            return None;
        }

        let mut sanitized: String = trimmed
            .chars()
            .filter(|c| !UNSAFE_CHARS.contains(c))
            .take(self.max_len)
            .collect();

        // Stripping can drop the text back under the minimum.
        sanitized = sanitized.trim().to_string();
        if sanitized.chars().count() < self.min_len {
            return None;
        }

        Some(sanitized)
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        QueryParser::new(&SearchConfig::default())
    }
}
