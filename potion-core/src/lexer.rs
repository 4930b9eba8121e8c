//! Lexer for Potion source text.

use core::fmt;

use crate::error::CoreError;

/// Kind of a token produced by the lexer.
///
/// Keywords are matched as whole words only, so `value` is an
/// identifier and not `val` followed by `ue`. `print` is deliberately
/// not a keyword; the parser special-cases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special; never produced by `lex`, synthesised by the parser
    Eof,

    // Identifiers and literals
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral, // true / false

    // Punctuation
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    Comma,  // ,
    Colon,  // :
    Assign, // =

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    EqEq,      // ==
    NotEq,     // !=
    Less,      // <
    Greater,   // >
    LessEq,    // <=
    GreaterEq, // >=
    FatArrow,  // =>

    // Keywords
    Val,
    Var,
    Fn,
    If,
    Else,
    Return,
    Send,
    Receive,
    Match,
    Spawn, // sp
    None,
}

impl TokenKind {
    /// Human readable name used in parse diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Ident => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::BoolLiteral => "boolean literal",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::LessEq => "'<='",
            TokenKind::GreaterEq => "'>='",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Val => "'val'",
            TokenKind::Var => "'var'",
            TokenKind::Fn => "'fn'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Return => "'return'",
            TokenKind::Send => "'send'",
            TokenKind::Receive => "'receive'",
            TokenKind::Match => "'match'",
            TokenKind::Spawn => "'sp'",
            TokenKind::None => "'none'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token: its kind, the exact source text, and the byte
/// offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
}

/// Whole-word keywords. Tried after an identifier has been scanned.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("val", TokenKind::Val),
    ("var", TokenKind::Var),
    ("fn", TokenKind::Fn),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("return", TokenKind::Return),
    ("send", TokenKind::Send),
    ("receive", TokenKind::Receive),
    ("match", TokenKind::Match),
    ("sp", TokenKind::Spawn),
    ("none", TokenKind::None),
    ("true", TokenKind::BoolLiteral),
    ("false", TokenKind::BoolLiteral),
];

/// Lex a source string into tokens.
///
/// Whitespace and `//` comments are dropped. The first character that
/// starts no token aborts lexing with `CoreError::LexError`. Empty
/// input yields an empty vector.
pub fn lex(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer {
        source,
        chars: source.as_bytes(),
        len: source.len(),
        index: 0,
    };
    lexer.run()
}

struct Lexer<'src> {
    source: &'src str,
    chars: &'src [u8],
    len: usize,
    index: usize,
}

impl<'src> Lexer<'src> {
    fn run(&mut self) -> Result<Vec<Token>, CoreError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) {
                self.consume_char();
                continue;
            }
            if !ch.is_ascii() {
                let decoded = self.current_char();
                if decoded.is_whitespace() {
                    self.index += decoded.len_utf8();
                    continue;
                }
                return Err(self.error(self.index, "unexpected character"));
            }

            let start = self.index;
            let token = match ch {
                b'(' => self.single(TokenKind::LParen, start),
                b')' => self.single(TokenKind::RParen, start),
                b'{' => self.single(TokenKind::LBrace, start),
                b'}' => self.single(TokenKind::RBrace, start),
                b',' => self.single(TokenKind::Comma, start),
                b':' => self.single(TokenKind::Colon, start),
                b'+' => self.single(TokenKind::Plus, start),
                b'-' => self.single(TokenKind::Minus, start),
                b'*' => self.single(TokenKind::Star, start),
                b'/' => {
                    if self.peek_next() == Some(b'/') {
                        self.skip_line_comment();
                        continue;
                    }
                    self.single(TokenKind::Slash, start)
                }
                b'=' => match self.peek_next() {
                    Some(b'=') => self.double(TokenKind::EqEq, start),
                    Some(b'>') => self.double(TokenKind::FatArrow, start),
                    _ => self.single(TokenKind::Assign, start),
                },
                b'!' => match self.peek_next() {
                    Some(b'=') => self.double(TokenKind::NotEq, start),
                    _ => return Err(self.error(start, "unexpected character")),
                },
                b'<' => match self.peek_next() {
                    Some(b'=') => self.double(TokenKind::LessEq, start),
                    _ => self.single(TokenKind::Less, start),
                },
                b'>' => match self.peek_next() {
                    Some(b'=') => self.double(TokenKind::GreaterEq, start),
                    _ => self.single(TokenKind::Greater, start),
                },
                b'"' => self.lex_string(start)?,
                b'0'..=b'9' => self.lex_number(start),
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(start),
                _ => return Err(self.error(start, "unexpected character")),
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.consume_char();
        self.token(kind, start)
    }

    fn double(&mut self, kind: TokenKind, start: usize) -> Token {
        self.consume_char();
        self.consume_char();
        self.token(kind, start)
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            lexeme: self.source[start..self.index].to_string(),
            position: start,
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == b'\n' {
                break;
            }
            self.consume_char();
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, CoreError> {
        // Opening quote
        self.consume_char();

        while let Some(ch) = self.peek_char() {
            match ch {
                b'"' => {
                    self.consume_char();
                    return Ok(self.token(TokenKind::StringLiteral, start));
                }
                b'\n' => break,
                _ => self.consume_char(),
            }
        }

        Err(self.error(start, "unterminated string literal"))
    }

    fn lex_number(&mut self, start: usize) -> Token {
        self.consume_digits();

        let mut kind = TokenKind::IntLiteral;
        if self.peek_char() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::FloatLiteral;
            self.consume_char(); // '.'
            self.consume_digits();
        }

        self.token(kind, start)
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.consume_char();
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Token {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }

        let text = &self.source[start..self.index];
        let kind = KEYWORDS
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, kind)| *kind)
            .unwrap_or(TokenKind::Ident);

        self.token(kind, start)
    }

    fn error(&self, position: usize, message: &str) -> CoreError {
        let found = self.source[position..].chars().next().unwrap_or('\0');
        let prefix = &self.source[..position];
        let line = prefix.matches('\n').count() + 1;
        let column = prefix
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        CoreError::LexError {
            found,
            position,
            line,
            column,
            message: message.to_string(),
        }
    }

    fn current_char(&self) -> char {
        self.source[self.index..].chars().next().unwrap_or('\0')
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if self.index < self.len {
            self.index += 1;
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lex should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_annotated_binding() {
        assert_eq!(
            kinds("val x: int = 5"),
            vec![
                TokenKind::Val,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::IntLiteral,
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("  \n\t // only a comment").unwrap().is_empty());
    }

    #[test]
    fn prefers_multi_character_operators() {
        assert_eq!(
            kinds("== != <= >= => < > ="),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::FatArrow,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
            ]
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let tokens = lex("val valor fn fnord sp spawn returns print").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Val,
                TokenKind::Ident,
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::Spawn,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
            ]
        );
        assert_eq!(tokens[1].lexeme, "valor");
    }

    #[test]
    fn string_lexeme_keeps_quotes() {
        let tokens = lex(r#"print("hello world")"#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].lexeme, "\"hello world\"");
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        let err = lex("42 3.5 7.").unwrap_err();
        // A lone '.' is not a token.
        assert!(matches!(err, CoreError::LexError { found: '.', .. }));
        assert_eq!(
            kinds("42 3.5"),
            vec![TokenKind::IntLiteral, TokenKind::FloatLiteral]
        );
    }

    #[test]
    fn skips_line_comments_but_keeps_division() {
        assert_eq!(
            kinds("a / b // trailing\nc"),
            vec![
                TokenKind::Ident,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn records_byte_positions() {
        let tokens = lex("fn  f()").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 4, 5, 6]);
    }

    #[test]
    fn rejects_unknown_character_with_location() {
        let err = lex("val x = 1\nval y = @").unwrap_err();
        assert_eq!(
            err,
            CoreError::LexError {
                found: '@',
                position: 18,
                line: 2,
                column: 9,
                message: "unexpected character".to_string(),
            }
        );
    }

    #[test]
    fn rejects_lone_bang_and_non_ascii() {
        assert!(matches!(
            lex("a ! b").unwrap_err(),
            CoreError::LexError { found: '!', .. }
        ));
        assert!(matches!(
            lex("val é = 1").unwrap_err(),
            CoreError::LexError { found: 'é', .. }
        ));
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = lex("val s = \"open\nval t = 1").unwrap_err();
        assert!(matches!(err, CoreError::LexError { found: '"', position: 8, .. }));
    }
}
