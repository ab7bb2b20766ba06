//! Field annotation tags.
//!
//! Tags are written as a sequence of `key:"value"` groups, for example
//! `#[config(tags = "rename:\"stars\" unit:\"count\"")]`.

/// Tag holding the serialized name of a field.
pub const RENAME_TAG: &str = "rename";

/// Ordered tag map with at most one entry per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tag text, silently ignoring anything that is not a `key:"value"` group.
    ///
    /// A later duplicate key overwrites the earlier value in place.
    pub fn parse(text: &str) -> Self {
        let mut tags = Self::new();
        tags.extend_from_str(text);
        tags
    }

    /// Parse tag text and merge the groups into this map.
    pub fn extend_from_str(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let key_start = pos;
            while pos < bytes.len() && is_word_byte(bytes[pos]) {
                pos += 1;
            }
            let key_end = pos;

            if key_end == key_start
                || pos + 1 >= bytes.len()
                || bytes[pos] != b':'
                || bytes[pos + 1] != b'"'
            {
                pos = key_end.max(key_start + 1);
                continue;
            }

            pos += 2;
            let mut value = String::new();
            let mut closed = false;
            let mut chars = text[pos..].char_indices();
            while let Some((offset, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    '"' => {
                        pos += offset + 1;
                        closed = true;
                        break;
                    }
                    _ => value.push(c),
                }
            }

            if !closed {
                return;
            }
            self.insert(&text[key_start..key_end], value);
        }
    }

    /// Set a tag, overwriting an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
