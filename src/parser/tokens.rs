use crate::model::{ResultStatus, SUBJECT_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Exactly 8 ASCII digits.
    Roll,
    /// Exactly 3 ASCII digits.
    Code,
    /// Any other all-digit token.
    Number,
    /// Uppercase letters mixed with digits, or plain uppercase words.
    Alnum,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    fn classify(text: &'a str) -> Self {
        let kind = if text.bytes().all(|b| b.is_ascii_digit()) {
            match text.len() {
                8 => TokenKind::Roll,
                3 => TokenKind::Code,
                _ => TokenKind::Number,
            }
        } else if text.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            TokenKind::Alnum
        } else {
            TokenKind::Word
        };
        Token { text, kind }
    }

    pub fn is_code(&self) -> bool {
        self.kind == TokenKind::Code
    }

    /// `[A-Z0-9]+`: what may follow a code inside a marks pair.
    pub fn is_grade(&self) -> bool {
        !matches!(self.kind, TokenKind::Word)
    }

    pub fn is_sex_marker(&self) -> bool {
        matches!(self.text, "M" | "F")
    }
}

pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    line.split_whitespace().map(Token::classify).collect()
}

/// Left-to-right `(code, grade)` pairs; stray tokens between pairs are skipped.
pub fn pairs<'a>(tokens: &[Token<'a>]) -> Vec<(&'a str, &'a str)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_code() && tokens.get(i + 1).is_some_and(Token::is_grade) {
            out.push((tokens[i].text, tokens[i + 1].text));
            i += 2;
        } else {
            i += 1;
        }
    }
    out
}

/// A marks row opens with five consecutive `(code, grade)` pairs.
pub fn leading_marks_row<'a>(tokens: &[Token<'a>]) -> Option<Vec<&'a str>> {
    if tokens.len() < SUBJECT_SLOTS * 2 {
        return None;
    }
    tokens
        .chunks_exact(2)
        .take(SUBJECT_SLOTS)
        .map(|pair| (pair[0].is_code() && pair[1].is_grade()).then_some(pair[0].text))
        .collect()
}

/// A header line opens with an 8-digit roll number, a sex marker and at least
/// one more token.
pub fn is_header(tokens: &[Token<'_>]) -> bool {
    tokens.len() >= 3 && tokens[0].kind == TokenKind::Roll && tokens[1].is_sex_marker()
}

/// First vocabulary phrase contained anywhere in `text`, probed in
/// `PASS, COMP, ESSENTIAL REPEAT, FAIL` order.
pub fn find_result_phrase(text: &str) -> Option<ResultStatus> {
    ResultStatus::ALL.into_iter().find(|s| text.contains(s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn classifies_tokens() {
        assert_eq!(
            kinds("12345678 F O'NEIL 041 A1 1234 ab"),
            vec![
                TokenKind::Roll,
                TokenKind::Alnum,
                TokenKind::Word,
                TokenKind::Code,
                TokenKind::Alnum,
                TokenKind::Number,
                TokenKind::Word,
            ]
        );
    }

    #[test]
    fn header_detection() {
        assert!(is_header(&tokenize("12345678 F JOHN DOE 101")));
        assert!(is_header(&tokenize("  87654321 M RAVI 301")));
        assert!(!is_header(&tokenize("12345678 F")));
        assert!(!is_header(&tokenize("123456789 F JOHN")));
        assert!(!is_header(&tokenize("12345678 X JOHN")));
        assert!(!is_header(&tokenize("090 A1 085 A2")));
    }

    #[test]
    fn pairs_skip_strays() {
        let toks = tokenize("090 A1 junk 085 A2 1234 077 B1 066");
        assert_eq!(pairs(&toks), vec![("090", "A1"), ("085", "A2"), ("077", "B1")]);
    }

    #[test]
    fn leading_marks_row_needs_five_pairs() {
        let toks = tokenize("090 A1 085 A2 092 A1 078 B2 088 A2 extra");
        assert_eq!(
            leading_marks_row(&toks),
            Some(vec!["090", "085", "092", "078", "088"])
        );
        assert_eq!(leading_marks_row(&tokenize("090 A1 085 A2 092 A1 078 B2")), None);
        assert_eq!(leading_marks_row(&tokenize("090 A1 085 a2 092 A1 078 B2 088 A2")), None);
    }

    #[test]
    fn result_phrase_order() {
        assert_eq!(find_result_phrase("X COMP Y PASS"), Some(ResultStatus::Pass));
        assert_eq!(find_result_phrase("A ESSENTIAL REPEAT"), Some(ResultStatus::EssentialRepeat));
        assert_eq!(find_result_phrase("nothing here"), None);
    }
}
