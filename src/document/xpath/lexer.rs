//! Tokenizer for XPath 1.0 expressions
//!
//! A name is an operator (`and`, `or`, `div`, `mod`) and `*` is multiplication
//! only when the previous token ends an operand. A name followed by `(` is a
//! function or node type, a name followed by `::` is an axis.

use crate::document::error::PathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NodeKind {
    Text,
    Comment,
    ProcessingInstruction,
    Any,
}

impl NodeKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(NodeKind::Text),
            "comment" => Some(NodeKind::Comment),
            "processing-instruction" => Some(NodeKind::ProcessingInstruction),
            "node" => Some(NodeKind::Any),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    DotDot,
    At,
    Comma,
    ColonColon,
    Slash,
    DoubleSlash,
    Pipe,
    Plus,
    Minus,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Multiply,
    And,
    Or,
    Div,
    Mod,
    Literal(String),
    Number(f64),
    Variable(String),
    /// `local: None` is the `*` or `prefix:*` wildcard.
    NameTest {
        prefix: Option<String>,
        local: Option<String>,
    },
    NodeType(NodeKind),
    FunctionName(String),
    AxisName(String),
}

impl Token {
    /// True when a token of this kind can end an operand, which makes the next
    /// `*` or name an operator.
    fn ends_operand(&self) -> bool {
        !matches!(
            self,
            Token::At
                | Token::ColonColon
                | Token::LParen
                | Token::LBracket
                | Token::Comma
                | Token::Slash
                | Token::DoubleSlash
                | Token::Pipe
                | Token::Plus
                | Token::Minus
                | Token::Eq
                | Token::NotEq
                | Token::Lt
                | Token::Le
                | Token::Gt
                | Token::Ge
                | Token::Multiply
                | Token::And
                | Token::Or
                | Token::Div
                | Token::Mod
        )
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Splits `src` into tokens paired with their byte offsets.
pub(super) fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, PathError> {
    Lexer {
        src,
        pos: 0,
        tokens: Vec::new(),
    }
    .run()
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    tokens: Vec<(Token, usize)>,
}

impl<'s> Lexer<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(is_space).len();
    }

    fn after_operand(&self) -> bool {
        self.tokens.last().map_or(false, |(t, _)| t.ends_operand())
    }

    fn run(mut self) -> Result<Vec<(Token, usize)>, PathError> {
        loop {
            self.skip_ws();
            let start = self.pos;
            let Some(c) = self.peek() else {
                return Ok(self.tokens);
            };

            let token = match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '@' => self.single(Token::At),
                ',' => self.single(Token::Comma),
                '|' => self.single(Token::Pipe),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '=' => self.single(Token::Eq),
                '!' if self.peek_second() == Some('=') => self.double(Token::NotEq),
                '<' if self.peek_second() == Some('=') => self.double(Token::Le),
                '<' => self.single(Token::Lt),
                '>' if self.peek_second() == Some('=') => self.double(Token::Ge),
                '>' => self.single(Token::Gt),
                '/' if self.peek_second() == Some('/') => self.double(Token::DoubleSlash),
                '/' => self.single(Token::Slash),
                ':' if self.peek_second() == Some(':') => self.double(Token::ColonColon),
                '.' if self.peek_second() == Some('.') => self.double(Token::DotDot),
                '.' if self.peek_second().map_or(false, |d| d.is_ascii_digit()) => {
                    self.number()
                }
                '.' => self.single(Token::Dot),
                '0'..='9' => self.number(),
                '"' | '\'' => self.literal(c)?,
                '$' => {
                    self.pos += 1;
                    match self.qname() {
                        Some(name) => Token::Variable(name),
                        None => return Err(self.unexpected()),
                    }
                }
                '*' if self.after_operand() => self.single(Token::Multiply),
                '*' => self.single(Token::NameTest {
                    prefix: None,
                    local: None,
                }),
                c if is_name_start(c) => self.name()?,
                found => {
                    return Err(PathError::UnexpectedChar {
                        found,
                        offset: start,
                    })
                }
            };

            self.tokens.push((token, start));
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn double(&mut self, token: Token) -> Token {
        self.pos += 2;
        token
    }

    fn unexpected(&self) -> PathError {
        match self.peek() {
            Some(found) => PathError::UnexpectedChar {
                found,
                offset: self.pos,
            },
            None => PathError::UnexpectedEnd,
        }
    }

    fn ncname(&mut self) -> Option<&'s str> {
        let rest = self.rest();
        if !rest.chars().next().map_or(false, is_name_start) {
            return None;
        }
        let len = rest.find(|c| !is_name_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Some(&rest[..len])
    }

    fn qname(&mut self) -> Option<String> {
        let prefix = self.ncname()?;
        if self.peek() == Some(':') && self.peek_second() != Some(':') {
            let save = self.pos;
            self.pos += 1;
            match self.ncname() {
                Some(local) => return Some(format!("{}:{}", prefix, local)),
                None => self.pos = save,
            }
        }
        Some(prefix.to_string())
    }

    fn number(&mut self) -> Token {
        let rest = self.rest();
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let mut len = int_len;
        if rest[len..].starts_with('.') {
            len += 1;
            len += rest[len..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len() - len);
        }
        self.pos += len;
        Token::Number(rest[..len].parse().unwrap_or(f64::NAN))
    }

    fn literal(&mut self, quote: char) -> Result<Token, PathError> {
        let open = self.pos;
        let body = &self.src[open + 1..];
        let end = body
            .find(quote)
            .ok_or(PathError::UnterminatedLiteral { offset: open })?;
        self.pos = open + 1 + end + 1;
        Ok(Token::Literal(body[..end].to_string()))
    }

    fn name(&mut self) -> Result<Token, PathError> {
        let start = self.pos;
        let first = self.ncname().unwrap_or_default();

        if self.after_operand() {
            return match first {
                "and" => Ok(Token::And),
                "or" => Ok(Token::Or),
                "div" => Ok(Token::Div),
                "mod" => Ok(Token::Mod),
                _ => Err(PathError::UnexpectedChar {
                    found: first.chars().next().unwrap_or(' '),
                    offset: start,
                }),
            };
        }

        let mut prefix = None;
        let mut local = Some(first.to_string());
        if self.peek() == Some(':') && self.peek_second() != Some(':') {
            self.pos += 1;
            prefix = Some(first.to_string());
            if self.peek() == Some('*') {
                self.pos += 1;
                local = None;
            } else {
                match self.ncname() {
                    Some(name) => local = Some(name.to_string()),
                    None => return Err(self.unexpected()),
                }
            }
        }

        let end = self.pos;
        self.skip_ws();
        let lookahead = self.rest();
        self.pos = end;

        match (prefix, local) {
            (None, Some(name)) if lookahead.starts_with("::") => Ok(Token::AxisName(name)),
            (prefix, Some(name)) if lookahead.starts_with('(') => {
                match (prefix, NodeKind::from_name(&name)) {
                    (None, Some(kind)) => Ok(Token::NodeType(kind)),
                    (Some(prefix), _) => Ok(Token::FunctionName(format!("{}:{}", prefix, name))),
                    (None, None) => Ok(Token::FunctionName(name)),
                }
            }
            (prefix, local) => Ok(Token::NameTest { prefix, local }),
        }
    }
}
