//! Lexer turning sanitized dump text into a flat stream of lower-case tokens.
//!
//! Whitespace separates tokens and is discarded. `,` and `;` always stand alone.
//! Other punctuation stays attached to its word, except that a bracket without
//! a partner inside the same word is split out: `varchar(10)` and `(id)` are one
//! token each, while `(id` becomes `(` `id` and `null)` becomes `null` `)`.

/// Tokenize `input` line by line. Letters are ASCII case-folded.
pub fn tokenize(input: &[u8]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = Vec::new();

    for line in input.split(|byte| *byte == b'\n') {
        for &byte in line {
            match byte {
                b',' | b';' => {
                    flush(&mut word, &mut tokens);
                    tokens.push(char::from(byte).to_string());
                }
                byte if byte.is_ascii_whitespace() => flush(&mut word, &mut tokens),
                byte => word.push(byte.to_ascii_lowercase()),
            }
        }
        flush(&mut word, &mut tokens);
    }

    tokens
}

fn flush(word: &mut Vec<u8>, tokens: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(word).into_owned();
    word.clear();
    split_unbalanced(&text, tokens);
}

/// Emit `word`, splitting every unmatched `(` or `)` into its own token.
fn split_unbalanced(word: &str, tokens: &mut Vec<String>) {
    let mut open = Vec::new();
    let mut unmatched = Vec::new();
    for (index, ch) in word.char_indices() {
        match ch {
            '(' => open.push(index),
            ')' if open.pop().is_none() => unmatched.push(index),
            _ => {}
        }
    }
    if open.is_empty() && unmatched.is_empty() {
        tokens.push(word.to_string());
        return;
    }

    unmatched.extend(open);
    unmatched.sort_unstable();

    let mut start = 0;
    for index in unmatched {
        if index > start {
            tokens.push(word[start..index].to_string());
        }
        tokens.push(word[index..index + 1].to_string());
        start = index + 1;
    }
    if start < word.len() {
        tokens.push(word[start..].to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(input: &str) -> Vec<String> {
        tokenize(input.as_bytes())
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(lex("INTEGER Integer integer"), vec!["integer"; 3]);
    }

    #[test]
    fn test_comma_and_semicolon_stand_alone() {
        assert_eq!(
            lex("id integer,name text;drop"),
            vec!["id", "integer", ",", "name", "text", ";", "drop"]
        );
    }

    #[test]
    fn test_dots_and_balanced_brackets_stay_attached() {
        assert_eq!(
            lex("public.users varchar(10) (id) nextval('public.t_id_seq'::regclass)"),
            vec![
                "public.users",
                "varchar(10)",
                "(id)",
                "nextval('public.t_id_seq'::regclass)",
            ]
        );
    }

    #[test]
    fn test_unbalanced_brackets_are_split() {
        assert_eq!(
            lex("CREATE TABLE users(id integer, name text NOT NULL);"),
            vec![
                "create", "table", "users", "(", "id", "integer", ",", "name", "text", "not",
                "null", ")", ";",
            ]
        );
        assert_eq!(lex("KEY (id));"), vec!["key", "(id)", ")", ";"]);
        assert_eq!(lex("numeric(10,2)"), vec!["numeric", "(", "10", ",", "2", ")"]);
    }

    #[test]
    fn test_lines_flush_pending_token() {
        assert_eq!(
            lex("CREATE TABLE public.users (\r\n    id bigint\n);\n"),
            vec!["create", "table", "public.users", "(", "id", "bigint", ")", ";"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(lex("").is_empty());
        assert!(lex(" \n\t\n").is_empty());
    }
}
