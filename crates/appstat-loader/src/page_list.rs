//! Codec for the visited-pages list literal
//!
//! The sessions export stores visited pages as a bracketed list of quoted
//! strings, e.g. `['home', "search"]`. Strings use single or double quotes
//! with backslash escapes. A trailing comma is allowed.

use thiserror::Error;

/// Why a list literal could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageListError {
    #[error("expected '[' at offset {0}")]
    MissingOpenBracket(usize),
    #[error("expected ']' or ',' at offset {0}")]
    ExpectedSeparator(usize),
    #[error("expected a quoted string at offset {0}")]
    ExpectedString(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unexpected trailing input at offset {0}")]
    TrailingInput(usize),
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    len: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            len: input.len(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn string(&mut self) -> Result<String, PageListError> {
        let start = self.offset();
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(PageListError::ExpectedString(start)),
        };

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(PageListError::UnterminatedString(start)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(PageListError::UnterminatedString(start)),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }
}

/// Decode a list literal; an empty or blank cell is an empty list
///
/// # Examples
/// ```
/// use appstat_loader::page_list::decode;
///
/// assert_eq!(decode("['home', 'search']").unwrap(), vec!["home", "search"]);
/// assert!(decode("").unwrap().is_empty());
/// assert!(decode("home, search").is_err());
/// ```
pub fn decode(input: &str) -> Result<Vec<String>, PageListError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    let open = cursor.offset();
    if cursor.bump() != Some('[') {
        return Err(PageListError::MissingOpenBracket(open));
    }

    let mut pages = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Err(PageListError::UnexpectedEnd),
            Some(']') => {
                cursor.bump();
                break;
            }
            Some(_) => pages.push(cursor.string()?),
        }

        cursor.skip_whitespace();
        let at = cursor.offset();
        match cursor.bump() {
            Some(',') => continue,
            Some(']') => break,
            None => return Err(PageListError::UnexpectedEnd),
            Some(_) => return Err(PageListError::ExpectedSeparator(at)),
        }
    }

    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return Err(PageListError::TrailingInput(cursor.offset()));
    }

    Ok(pages)
}

/// Encode pages as a canonical single-quoted literal
pub fn encode<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::from("[");
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('\'');
        for c in page.as_ref().chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                c => out.push(c),
            }
        }
        out.push('\'');
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_variants() {
        assert_eq!(decode("[]").unwrap(), Vec::<String>::new());
        assert_eq!(decode("  [ 'a' , \"b\", ]  ").unwrap(), vec!["a", "b"]);
        assert_eq!(decode(r"['it\'s', 'a\\b']").unwrap(), vec!["it's", "a\\b"]);
        assert_eq!(decode(r#"["say \"hi\""]"#).unwrap(), vec!["say \"hi\""]);
        assert_eq!(decode(r"['keep\q']").unwrap(), vec!["keep\\q"]);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("'a'"), Err(PageListError::MissingOpenBracket(0)));
        assert_eq!(decode("['a"), Err(PageListError::UnterminatedString(1)));
        assert_eq!(decode("['a', 3]"), Err(PageListError::ExpectedString(6)));
        assert_eq!(decode("['a' 'b']"), Err(PageListError::ExpectedSeparator(5)));
        assert_eq!(decode("['a'] x"), Err(PageListError::TrailingInput(6)));
        assert_eq!(decode("['a',"), Err(PageListError::UnexpectedEnd));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&["home", "it's"]), r"['home', 'it\'s']");
        assert_eq!(encode::<&str>(&[]), "[]");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(pages in prop::collection::vec(".*", 0..8)) {
            prop_assert_eq!(decode(&encode(&pages)).unwrap(), pages);
        }
    }
}
