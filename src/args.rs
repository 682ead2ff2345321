//! Prompt line tokenizer.
//!
//! Whitespace splits tokens unless it sits inside a matching pair of quotes
//! (`"`, `'` or `` ` ``). Quotes are kept in the token so a tool can decide
//! whether to strip them (see [`unquote`]) or forward them to a shell.

const QUOTES: [char; 3] = ['"', '\'', '`'];

fn is_quote(c: char) -> bool {
    QUOTES.contains(&c)
}

/// Split a raw input line into tokens.
///
/// * an empty or blank line yields no tokens
/// * `\"` never opens or closes a quoted span and is kept as written
/// * an opening quote without a partner is an ordinary character
pub fn split_line(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let quoted = quoted_mask(&chars);

    let mut tokens = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() && !quoted[i] {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Marks every position covered by a balanced quoted span, quotes included.
fn quoted_mask(chars: &[char]) -> Vec<bool> {
    let mut mask = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if is_quote(c) {
            if let Some(end) = closing_quote(chars, i) {
                mask[i..=end].iter_mut().for_each(|m| *m = true);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    mask
}

fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut k = open + 1;
    while k < chars.len() {
        match chars[k] {
            '\\' => k += 2,
            c if c == quote => return Some(k),
            _ => k += 1,
        }
    }
    None
}

/// Strip one pair of matching surrounding quotes, if present.
pub fn unquote(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && is_quote(first) => {
            &token[first.len_utf8()..token.len() - last.len_utf8()]
        }
        _ => token,
    }
}
