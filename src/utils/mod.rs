//! Small helpers shared by the modules.

use uuid::Uuid;

/// In-memory object identity.
///
/// Assigned when an entity value is constructed and shared by its clones, it
/// tells "the same book" apart from "an equal book" before the store has
/// assigned a key. Never serialized or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(Uuid);

impl Handle {
    pub fn fresh() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handles_differ_and_copies_match() {
        let a = Handle::fresh();
        let b = Handle::fresh();
        let copy = a;
        assert_ne!(a, b);
        assert_eq!(a, copy);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Clean Code"), "Clean Code");
    }
}
