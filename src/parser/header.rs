//! Header grammar shared by the line-oriented extractors:
//!
//! ```text
//! header := ROLL SEX name codes rest
//! name   := (token that is not a 3-digit code)*
//! codes  := CODE*
//! ```

use crate::error::MalformedRecord;

use super::tokens::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'t, 'a> {
    pub roll: &'a str,
    pub name_parts: Vec<&'a str>,
    pub codes: Vec<&'a str>,
    /// Everything after the last subject code.
    pub rest: &'t [Token<'a>],
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'t Token<'a>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn take_while(&mut self, pred: impl Fn(&Token<'a>) -> bool) -> Vec<&'a str> {
        let mut out = Vec::new();
        while let Some(tok) = self.peek().filter(|t| pred(t)) {
            out.push(tok.text);
            self.pos += 1;
        }
        out
    }

    fn rest(&self) -> &'t [Token<'a>] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }
}

pub fn parse_header<'t, 'a>(tokens: &'t [Token<'a>]) -> Result<Header<'t, 'a>, MalformedRecord> {
    let mut cur = Cursor { tokens, pos: 0 };
    let roll = roll(&mut cur)?;
    sex_marker(&mut cur)?;
    let name_parts = cur.take_while(|t| !t.is_code());
    let codes = cur.take_while(Token::is_code);
    Ok(Header {
        roll,
        name_parts,
        codes,
        rest: cur.rest(),
    })
}

fn roll<'a>(cur: &mut Cursor<'_, 'a>) -> Result<&'a str, MalformedRecord> {
    match cur.bump() {
        Some(tok) if tok.kind == TokenKind::Roll => Ok(tok.text),
        _ => Err(MalformedRecord::BadHeader {
            reason: "expected an 8-digit roll number",
        }),
    }
}

fn sex_marker(cur: &mut Cursor<'_, '_>) -> Result<(), MalformedRecord> {
    match cur.bump() {
        Some(tok) if tok.is_sex_marker() => Ok(()),
        _ => Err(MalformedRecord::BadHeader {
            reason: "expected a sex marker after the roll number",
        }),
    }
}
