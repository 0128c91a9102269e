// Whitelist: request paths exempt from authentication

use regex::Regex;
use tracing::warn;

enum Entry {
    Literal(String),
    Pattern(Regex),
}

/// Ordered set of path patterns, loaded once at boot and immutable for the
/// process lifetime. Entries beginning with `^` are anchored regexes;
/// everything else matches by exact string equality. First match exempts.
pub struct Whitelist {
    entries: Vec<Entry>,
}

impl Whitelist {
    /// Parse a comma-separated pattern list. An uncompilable regex entry is
    /// logged and dropped rather than failing boot.
    pub fn parse(items: &str) -> Self {
        let mut entries = Vec::new();
        for item in items.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            if item.starts_with('^') {
                match Regex::new(item) {
                    Ok(pattern) => entries.push(Entry::Pattern(pattern)),
                    Err(e) => warn!(pattern = item, error = %e, "whitelist pattern dropped"),
                }
            } else {
                entries.push(Entry::Literal(item.to_string()));
            }
        }
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether a request path bypasses authentication entirely.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            Entry::Literal(literal) => literal == path,
            Entry::Pattern(pattern) => pattern.is_match(path),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
