//! Variant H's punctuation tokenizer.
//!
//! Splits a field value into a flat token sequence on a fixed set of
//! delimiter characters, keeping each delimiter as its own token so the
//! original string can be rebuilt by concatenation.

/// Delimiters that end a literal run and become one-character tokens of
/// their own. Order has no meaning; membership is all that matters.
pub const DELIMITERS: [char; 9] = ['/', ' ', '?', '&', '=', ':', '[', ']', '"'];

fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Split `value` into delimiter tokens and literal-run tokens, in order.
/// Empty literal runs (two adjacent delimiters, or a delimiter at either
/// end) are suppressed: nothing is pushed for a zero-length gap.
pub fn tokenize(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    for c in value.chars() {
        if is_delimiter(c) {
            if !literal.is_empty() {
                tokens.push(std::mem::take(&mut literal));
            }
            tokens.push(c.to_string());
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        tokens.push(literal);
    }
    tokens
}

/// Inverse of [`tokenize`]: concatenating the tokens reproduces the input
/// exactly, since delimiter suppression only ever drops empty strings.
pub fn detokenize(tokens: &[String]) -> String {
    tokens.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_every_delimiter_class() {
        let tokens = tokenize("/api/v1?x=1&y=2");
        assert_eq!(
            tokens,
            vec!["/", "api", "/", "v1", "?", "x", "=", "1", "&", "y", "=", "2"]
        );
    }

    #[test]
    fn adjacent_delimiters_suppress_empty_literals() {
        let tokens = tokenize("a//b");
        assert_eq!(tokens, vec!["a", "/", "/", "b"]);
    }

    #[test]
    fn leading_and_trailing_delimiters_suppress_empty_literals() {
        let tokens = tokenize("/leading and trailing/");
        assert_eq!(tokens.first(), Some(&"/".to_string()));
        assert_eq!(tokens.last(), Some(&"/".to_string()));
        assert!(tokens.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn no_delimiters_is_single_token() {
        assert_eq!(tokenize("plainliteral"), vec!["plainliteral"]);
    }

    #[test]
    fn empty_string_is_no_tokens() {
        assert_eq!(tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn tokenize_detokenize_roundtrip() {
        for s in [
            "/api/v1/users?id=42&name=bob",
            "[GET] \"/path\" host:8080",
            "no-punct-here",
            "///",
            "",
        ] {
            assert_eq!(detokenize(&tokenize(s)), s);
        }
    }
}
