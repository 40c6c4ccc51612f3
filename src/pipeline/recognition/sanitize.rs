/// Sanitize fused OCR text before correction and parsing.
/// Strips control characters, trims lines, collapses blank lines, and keeps
/// the punctuation contact details depend on (@, +, /, dots, dashes).
pub fn sanitize_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '+'
                        | '#'
                        | '@'
                        | '&'
                        | '\''
                        | '"'
                        | '|'
                        | '_'
                        | '\u{2013}' // en-dash
                        | '\u{2014}' // em-dash
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
