//! Reading JSON with comments.
//!
//! Generated `.jsonc` templates carry `//` comments; settings loaders strip
//! them before handing the bytes to `serde_json`.

use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    String,
    Escape,
    Slash,
    LineComment,
    BlockComment,
    BlockStar,
}

/// Remove `//` and `/* */` comments outside of string literals.
///
/// Every other byte, whitespace included, is kept as is. A line comment's
/// terminating newline is kept; an unterminated block comment swallows the
/// rest of the input.
pub fn strip_comments(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut state = State::Code;

    for &byte in input {
        state = match (state, byte) {
            (State::Code, b'"') => {
                out.push(byte);
                State::String
            }
            (State::Code, b'/') => State::Slash,
            (State::Code, _) => {
                out.push(byte);
                State::Code
            }

            (State::String, b'\\') => {
                out.push(byte);
                State::Escape
            }
            (State::String, b'"') => {
                out.push(byte);
                State::Code
            }
            (State::String, _) | (State::Escape, _) => {
                out.push(byte);
                State::String
            }

            (State::Slash, b'/') => State::LineComment,
            (State::Slash, b'*') => State::BlockComment,
            (State::Slash, _) => {
                // A lone slash is not a comment.
                out.push(b'/');
                out.push(byte);
                if byte == b'"' {
                    State::String
                } else {
                    State::Code
                }
            }

            (State::LineComment, b'\n') => {
                out.push(byte);
                State::Code
            }
            (State::LineComment, _) => State::LineComment,

            (State::BlockComment, b'*') | (State::BlockStar, b'*') => State::BlockStar,
            (State::BlockStar, b'/') => State::Code,
            (State::BlockComment, _) | (State::BlockStar, _) => State::BlockComment,
        };
    }

    if state == State::Slash {
        out.push(b'/');
    }

    out
}

/// Deserialize a JSONC document.
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(&strip_comments(input))
}

/// Deserialize a JSONC document from text.
pub fn from_str<T: DeserializeOwned>(input: &str) -> serde_json::Result<T> {
    from_slice(input.as_bytes())
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z/*]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Comment-free JSON passes through unchanged.
        #[test]
        fn prop_identity_without_comments(value in json_value()) {
            let text = serde_json::to_string_pretty(&value).unwrap();
            prop_assert_eq!(strip_comments(text.as_bytes()), text.as_bytes().to_vec());
        }

        /// Comments added between tokens do not change the parsed value.
        #[test]
        fn prop_comments_are_ignored(value in json_value(), note in "[ -~&&[^*]]{0,16}") {
            let text = serde_json::to_string_pretty(&value).unwrap();
            let commented: String = text
                .lines()
                .map(|line| format!("{} // {}\n/* {} */", line, note, note))
                .collect::<Vec<_>>()
                .join("\n");

            let parsed: Value = from_str(&commented).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
