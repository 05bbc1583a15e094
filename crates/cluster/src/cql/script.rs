/// Splits a CQL script into statements on `;`.
///
/// Semicolons inside quoted literals, comments, and between `BEGIN BATCH`
/// and `APPLY BATCH` do not end a statement. Empty statements are dropped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut in_batch = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                current.push(ch);
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == ch {
                        if chars.peek() == Some(&ch) {
                            current.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            '-' | '/' if chars.peek() == Some(&ch) => {
                skip_line(&mut chars);
                current.push('\n');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                current.push(' ');
            }
            ';' => {
                let upper = current.to_ascii_uppercase();
                let words: Vec<&str> = upper.split_whitespace().collect();
                if words.first() == Some(&"BEGIN") {
                    in_batch = true;
                }
                if in_batch && !words.ends_with(&["APPLY", "BATCH"]) {
                    current.push(ch);
                    continue;
                }
                in_batch = false;
                push_statement(&mut statements, &mut current);
            }
            _ => current.push(ch),
        }
    }
    push_statement(&mut statements, &mut current);

    statements
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    for ch in chars.by_ref() {
        if ch == '\n' {
            break;
        }
    }
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_script() {
        let statements = split_statements(
            "CREATE TABLE t (k int PRIMARY KEY, v text);\n\
             -- seed; with a comment\n\
             INSERT INTO t (k, v) VALUES (1, 'a;b');\n\n\
             SELECT * FROM t",
        );
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[1], "INSERT INTO t (k, v) VALUES (1, 'a;b')");
        assert_eq!(statements[2], "SELECT * FROM t");
    }

    #[test]
    fn test_batch_is_kept_whole() {
        let statements = split_statements(
            "BEGIN BATCH INSERT INTO t (k) VALUES (1); INSERT INTO t (k) VALUES (2); APPLY BATCH;\
             SELECT COUNT(*) FROM t;",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("BEGIN BATCH"));
        assert!(statements[0].ends_with("APPLY BATCH"));
    }

    #[test]
    fn test_block_comments_and_escaped_quotes() {
        let statements =
            split_statements("/* a; b */ INSERT INTO t (v) VALUES ('it''s;');;;");
        assert_eq!(statements, vec!["INSERT INTO t (v) VALUES ('it''s;')"]);
    }
}
