use std::collections::HashMap;
use std::sync::OnceLock;

use crate::token::{lookup_ident, Token, TokenKind};

/// Byte-at-a-time scanner with a single byte of lookahead. `position` points
/// at the byte under examination, `read_position` just past it.
pub struct Lexer {
    input: Vec<u8>,
    position: usize,
    read_position: usize,
    ch: u8,
    line: usize,
    column: usize,
}

const EOF_BYTE: u8 = 0;

struct OperatorNode {
    kind: TokenKind,
    extensions: HashMap<u8, TokenKind>,
}

// The order matters here: a two-byte operator must be preceded by an entry
// for its first byte, even if that byte on its own is an illegal token.
const OPERATOR_TABLE: &[(&str, TokenKind)] = &[
    ("!", TokenKind::Bang),
    ("!=", TokenKind::Illegal),
    ("=", TokenKind::Assign),
    ("==", TokenKind::Illegal),
    (">", TokenKind::Illegal),
    (">=", TokenKind::GtEq),
    ("<", TokenKind::Illegal),
    ("<=", TokenKind::Illegal),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("&", TokenKind::Illegal),
    ("&&", TokenKind::And),
    ("|", TokenKind::Illegal),
    ("||", TokenKind::Or),
    ("*", TokenKind::Asterisk),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("(", TokenKind::Lparen),
    (")", TokenKind::Rparen),
    ("{", TokenKind::Lbrace),
    ("}", TokenKind::Rbrace),
    ("[", TokenKind::Lbracket),
    ("]", TokenKind::Rbracket),
    (":", TokenKind::Colon),
    (".", TokenKind::Period),
];

fn operator_trie() -> &'static HashMap<u8, OperatorNode> {
    static TRIE: OnceLock<HashMap<u8, OperatorNode>> = OnceLock::new();
    TRIE.get_or_init(|| {
        let mut roots: HashMap<u8, OperatorNode> = HashMap::new();
        for (literal, kind) in OPERATOR_TABLE {
            match *literal.as_bytes() {
                [first] => {
                    roots.entry(first).or_insert_with(|| OperatorNode {
                        kind: *kind,
                        extensions: HashMap::new(),
                    });
                }
                [first, second] => {
                    let node = roots.entry(first).or_insert_with(|| OperatorNode {
                        kind: *kind,
                        extensions: HashMap::new(),
                    });
                    node.extensions.insert(second, *kind);
                }
                _ => panic!("only operators of length 1 and 2 are supported"),
            }
        }
        roots
    })
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.as_bytes().to_vec(),
            position: 0,
            read_position: 0,
            ch: EOF_BYTE,
            line: 0,
            column: 0,
        };
        lexer.read_char();
        lexer
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        let token = match self.ch {
            b'/' if self.peek_char() == b'/' => {
                return Token::new(TokenKind::Comment, self.read_comment(), line, column);
            }
            b'/' => Token::new(TokenKind::Slash, "/", line, column),
            EOF_BYTE => Token::new(TokenKind::Eof, "", line, column),
            b'"' => Token::new(TokenKind::Str, self.read_string(), line, column),
            ch => {
                if let Some(token) = self.read_known_token(line, column) {
                    self.read_char();
                    return token;
                }

                if is_identifier_start(ch) {
                    let literal = self.read_identifier();
                    let kind = lookup_ident(&literal);
                    return Token::new(kind, literal, line, column);
                }

                if ch.is_ascii_digit() {
                    return Token::new(TokenKind::Int, self.read_number(), line, column);
                }

                Token::new(TokenKind::Illegal, (ch as char).to_string(), line, column)
            }
        };

        self.read_char();
        token
    }

    /// Looks the current byte up in the operator trie. If the two-byte
    /// extension also exists, both bytes are consumed and the longer token
    /// wins; otherwise the one-byte token is emitted.
    fn read_known_token(&mut self, line: usize, column: usize) -> Option<Token> {
        let trie = operator_trie();
        let node = trie.get(&self.ch)?;

        let first = self.ch;
        let next = self.peek_char();
        if let Some(extended) = node.extensions.get(&next) {
            self.read_char();
            let literal = String::from_utf8_lossy(&[first, next]).into_owned();
            return Some(Token::new(*extended, literal, line, column));
        }

        Some(Token::new(
            node.kind,
            (first as char).to_string(),
            line,
            column,
        ))
    }

    fn read_char(&mut self) {
        if self.read_position >= self.input.len() {
            self.ch = EOF_BYTE;
        } else {
            self.ch = self.input[self.read_position];
        }
        self.position = self.read_position;
        self.read_position += 1;
        self.column += 1;
    }

    fn peek_char(&self) -> u8 {
        if self.read_position >= self.input.len() {
            EOF_BYTE
        } else {
            self.input[self.read_position]
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            if self.ch == b'\n' {
                self.line += 1;
                self.column = 0;
            }
            self.read_char();
        }
    }

    fn read_string(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.ch == b'"' || self.ch == EOF_BYTE {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        // the bang is here for the sake of the 'NO!' token,
        // and the ? is here for the sake of the 'ayok?' builtin function
        while is_identifier_start(self.ch)
            || (b'1'..=b'9').contains(&self.ch)
            || self.ch == b'!'
            || self.ch == b'?'
        {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    fn read_number(&mut self) -> String {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    fn read_comment(&mut self) -> String {
        let start = self.position;
        while self.ch != b'\n' && self.ch != EOF_BYTE {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }
}

fn is_identifier_start(ch: u8) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_uppercase() || ch == b'_'
}
