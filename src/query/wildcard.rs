//! SQL-style wildcard matching for `$like`
//!
//! `%` matches any run of characters (including none), `_` matches exactly
//! one character. The match is case-sensitive and anchored at both ends.

/// One piece of a tokenized pattern
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A run of ordinary characters
    Literal(Vec<char>),
    /// `_`
    One,
    /// `%`
    Any,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = Vec::new();

    for c in pattern.chars() {
        let wildcard = match c {
            '%' => Token::Any,
            '_' => Token::One,
            _ => {
                literal.push(c);
                continue;
            }
        };
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(wildcard);
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}

/// Match `text` against a `%`/`_` pattern
///
/// Backtracking scan: on a mismatch, resume one character past the start of
/// the most recent `%`. Worst case O(text × pattern).
pub fn like(text: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return text.is_empty();
    }

    let text: Vec<char> = text.chars().collect();
    let tokens = tokenize(pattern);

    let mut i = 0; // position in text
    let mut j = 0; // position in tokens
    // (text position the last `%` started at, token index of that `%`)
    let mut checkpoint: Option<(usize, usize)> = None;

    while i < text.len() {
        match tokens.get(j) {
            Some(Token::One) => {
                i += 1;
                j += 1;
            }
            Some(Token::Any) => {
                checkpoint = Some((i, j));
                j += 1;
            }
            Some(Token::Literal(lit)) if text[i..].starts_with(lit) => {
                i += lit.len();
                j += 1;
            }
            _ => match checkpoint.as_mut() {
                Some((star_i, star_j)) => {
                    *star_i += 1;
                    i = *star_i;
                    j = *star_j + 1;
                }
                None => return false,
            },
        }
    }

    while matches!(tokens.get(j), Some(Token::Any)) {
        j += 1;
    }

    j == tokens.len()
}
