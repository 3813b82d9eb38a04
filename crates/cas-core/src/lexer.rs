//! Tokenizer for algebraic expressions.

use crate::{CasError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Equals,
    LParen,
    RParen,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::Caret => f.write_str("^"),
            TokenKind::Equals => f.write_str("="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::End => f.write_str("end of input"),
        }
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Tokenize the whole input. The last token is always `End`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::End;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let Some(&(position, c)) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::End,
                position: self.input.len(),
            });
        };

        if c.is_ascii_digit() || c == '.' {
            return self.number(position);
        }
        if c.is_alphabetic() {
            return Ok(self.identifier(position));
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '=' => TokenKind::Equals,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            found => return Err(CasError::UnknownCharacter { found, position }),
        };
        self.chars.next();
        Ok(Token { kind, position })
    }

    fn number(&mut self, start: usize) -> Result<Token> {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let literal = &self.input[start..end];
        let value = literal
            .parse::<f64>()
            .map_err(|_| CasError::InvalidNumber(literal.to_string()))?;
        Ok(Token {
            kind: TokenKind::Number(value),
            position: start,
        })
    }

    fn identifier(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Ident(self.input[start..end].to_string()),
            position: start,
        }
    }
}

/// Whether `name` lexes as exactly one identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_grouped_sum() {
        assert_eq!(
            kinds("(3 + 2) * 1"),
            vec![
                TokenKind::LParen,
                TokenKind::Number(3.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::Number(1.0),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_number_followed_by_identifier() {
        assert_eq!(
            kinds("2.5x1"),
            vec![
                TokenKind::Number(2.5),
                TokenKind::Ident("x1".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_unknown_character_reports_position() {
        let err = Lexer::new("1 + $").tokenize().unwrap_err();
        assert_eq!(
            err,
            CasError::UnknownCharacter {
                found: '$',
                position: 4
            }
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let tokens = Lexer::new("é + $x").tokenize();
        assert_eq!(
            tokens.unwrap_err(),
            CasError::UnknownCharacter {
                found: '$',
                position: 5
            }
        );
        let tokens = Lexer::new("é + x").tokenize().unwrap();
        assert_eq!(tokens[1].position, 3);
    }

    #[test]
    fn test_malformed_number() {
        let err = Lexer::new("1.2.3").tokenize().unwrap_err();
        assert_eq!(err, CasError::InvalidNumber("1.2.3".into()));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("rate_2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("x y"));
        assert!(!is_identifier(""));
    }
}
