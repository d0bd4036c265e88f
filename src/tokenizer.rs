//! Quote-aware splitting of a single line into fields.
//!
//! Lines are split from the input text before tokenization, so a quoted
//! field can never contain a newline. A record whose quoted field spans two
//! physical lines fails on both halves with [`LineError::UnterminatedQuote`].

/// The three characters that drive tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
    pub escape: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: '"',
        }
    }
}

impl Dialect {
    /// True when escaping is done by doubling the quote character.
    pub fn doubles_quotes(&self) -> bool {
        self.escape == self.quote
    }
}

/// A failure confined to one line of input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("Unterminated quoted field at position {field}")]
    UnterminatedQuote { field: usize },
}

/// Splits `line` into trimmed fields.
///
/// An empty line yields a single empty field. Inside a quoted region a
/// doubled quote is a literal quote; when the dialect's escape differs from
/// its quote, the escape character also makes the following character
/// literal.
pub fn split_fields(line: &str, dialect: &Dialect) -> Result<Vec<String>, LineError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes && !dialect.doubles_quotes() && ch == dialect.escape {
            match chars.next() {
                Some(escaped) => current.push(escaped),
                None => break,
            }
            continue;
        }

        if ch == dialect.quote {
            if in_quotes && chars.peek() == Some(&dialect.quote) {
                chars.next();
                current.push(dialect.quote);
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }

        if ch == dialect.delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(LineError::UnterminatedQuote {
            field: fields.len(),
        });
    }

    fields.push(current.trim().to_string());
    Ok(fields)
}
