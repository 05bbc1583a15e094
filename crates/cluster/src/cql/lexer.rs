use driver::error::QueryError;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unquoted identifier or keyword, lowercased.
    Ident(String),
    /// Double-quoted identifier, case preserved.
    QuotedIdent(String),
    Str(String),
    /// Unsigned numeric literal, kept as written so it can be parsed
    /// against the target column type.
    Number(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Marker,
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

const PUNCTS: [&str; 17] = [
    "<=", ">=", "!=", "(", ")", ",", ";", "=", "*", ".", "+", "-", "<", ">", "{", "}", ":",
];

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, QueryError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if input[pos..].starts_with("--") || input[pos..].starts_with("//") {
            pos = input[pos..].find('\n').map_or(bytes.len(), |end| pos + end);
            continue;
        }

        if input[pos..].starts_with("/*") {
            let end = input[pos + 2..]
                .find("*/")
                .ok_or_else(|| syntax(pos, "unterminated comment"))?;
            pos += end + 4;
            continue;
        }

        let start = pos;
        let token = match c {
            b'\'' => {
                let (value, next) = quoted(input, pos, '\'')?;
                pos = next;
                Token::Str(value)
            }
            b'"' => {
                let (value, next) = quoted(input, pos, '"')?;
                pos = next;
                Token::QuotedIdent(value)
            }
            b'?' => {
                pos += 1;
                Token::Marker
            }
            _ if c.is_ascii_alphanumeric() => {
                if let Some(uuid) = uuid_at(input, pos) {
                    pos += 36;
                    Token::Uuid(uuid)
                } else if c == b'0' && matches!(bytes.get(pos + 1), Some(b'x' | b'X')) {
                    let (blob, next) = blob(input, pos)?;
                    pos = next;
                    Token::Blob(blob)
                } else if c.is_ascii_digit() {
                    let next = number_end(bytes, pos);
                    let text = input[pos..next].to_string();
                    pos = next;
                    Token::Number(text)
                } else {
                    let next = ident_end(bytes, pos);
                    let text = input[pos..next].to_ascii_lowercase();
                    pos = next;
                    Token::Ident(text)
                }
            }
            b'_' => {
                let next = ident_end(bytes, pos);
                let text = input[pos..next].to_ascii_lowercase();
                pos = next;
                Token::Ident(text)
            }
            b'.' if bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()) => {
                let next = number_end(bytes, pos);
                let text = format!("0{}", &input[pos..next]);
                pos = next;
                Token::Number(text)
            }
            _ => {
                let punct = PUNCTS
                    .iter()
                    .find(|p| input[pos..].starts_with(**p))
                    .ok_or_else(|| {
                        let ch = input[pos..].chars().next().unwrap_or_default();
                        syntax(pos, &format!("unexpected character '{ch}'"))
                    })?;
                pos += punct.len();
                Token::Punct(punct)
            }
        };

        tokens.push(Spanned { token, pos: start });
    }

    Ok(tokens)
}

fn syntax(pos: usize, message: &str) -> QueryError {
    QueryError::Syntax(format!("{message} at position {pos}"))
}

/// Reads a literal delimited by `quote`; a doubled quote is an escaped one.
fn quoted(input: &str, start: usize, quote: char) -> Result<(String, usize), QueryError> {
    let mut value = String::new();
    let mut chars = input[start + 1..].char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch == quote {
            if chars.peek().is_some_and(|(_, next)| *next == quote) {
                chars.next();
                value.push(quote);
            } else {
                return Ok((value, start + 1 + offset + ch.len_utf8()));
            }
        } else {
            value.push(ch);
        }
    }

    Err(syntax(start, "unterminated quoted literal"))
}

fn uuid_at(input: &str, pos: usize) -> Option<Uuid> {
    let candidate = input.get(pos..pos + 36)?;
    let shape_ok = candidate.char_indices().all(|(i, ch)| match i {
        8 | 13 | 18 | 23 => ch == '-',
        _ => ch.is_ascii_hexdigit(),
    });
    let boundary = input[pos + 36..]
        .chars()
        .next()
        .is_none_or(|ch| !(ch.is_ascii_alphanumeric() || ch == '_'));

    if shape_ok && boundary {
        Uuid::parse_str(candidate).ok()
    } else {
        None
    }
}

fn blob(input: &str, pos: usize) -> Result<(Vec<u8>, usize), QueryError> {
    let bytes = input.as_bytes();
    let mut end = pos + 2;
    while end < bytes.len() && bytes[end].is_ascii_hexdigit() {
        end += 1;
    }

    let hex = &input[pos + 2..end];
    if hex.len() % 2 != 0 {
        return Err(syntax(pos, "blob literal has an odd number of hex digits"));
    }

    let blob = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| syntax(pos, "invalid blob literal"))?;
    Ok((blob, end))
}

fn number_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

fn ident_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_keywords_are_lowercased() {
        assert_eq!(
            kinds("SELECT * from Users;"),
            vec![
                Token::Ident("select".into()),
                Token::Punct("*"),
                Token::Ident("from".into()),
                Token::Ident("users".into()),
                Token::Punct(";"),
            ]
        );
    }

    #[test]
    fn test_literals() {
        let id = Uuid::new_v4();
        let tokens = kinds(&format!(
            "VALUES ({id}, 'it''s', 0x0aFF, 3.4028235E+38, -12, ?, \"Quoted\")"
        ));
        assert_eq!(tokens[2], Token::Uuid(id));
        assert_eq!(tokens[4], Token::Str("it's".into()));
        assert_eq!(tokens[6], Token::Blob(vec![0x0a, 0xff]));
        assert_eq!(tokens[8], Token::Number("3.4028235E+38".into()));
        assert_eq!(tokens[10], Token::Punct("-"));
        assert_eq!(tokens[11], Token::Number("12".into()));
        assert_eq!(tokens[13], Token::Marker);
        assert_eq!(tokens[15], Token::QuotedIdent("Quoted".into()));
    }

    #[test]
    fn test_uuid_starting_with_digits() {
        let tokens = kinds("12345678-1234-1234-1234-123456789abc");
        assert!(matches!(tokens[0], Token::Uuid(_)));
    }

    #[test]
    fn test_comments_and_operators() {
        let tokens = kinds("-- note\nWHERE a >= 1 /* block */ AND b <= 2");
        assert_eq!(tokens[2], Token::Punct(">="));
        assert_eq!(tokens[6], Token::Punct("<="));
    }

    #[test]
    fn test_unicode_strings() {
        assert_eq!(kinds("'Małysz'"), vec![Token::Str("Małysz".into())]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(tokenize("'open"), Err(QueryError::Syntax(_))));
        assert!(matches!(tokenize("0xabc"), Err(QueryError::Syntax(_))));
        assert!(matches!(tokenize("a # b"), Err(QueryError::Syntax(_))));
    }
}
