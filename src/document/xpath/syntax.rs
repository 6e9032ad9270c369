//! Expression tree and recursive-descent parser for XPath 1.0

use super::lexer::{tokenize, NodeKind, Token};
use crate::document::error::PathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "attribute" => Axis::Attribute,
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "following" => Axis::Following,
            "following-sibling" => Axis::FollowingSibling,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "preceding" => Axis::Preceding,
            "preceding-sibling" => Axis::PrecedingSibling,
            "self" => Axis::SelfAxis,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum NodeTest {
    Name {
        prefix: Option<String>,
        local: Option<String>,
    },
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    Node,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn abbreviated(axis: Axis) -> Self {
        Step {
            axis,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum PathStart {
    Root,
    Context,
    Filter(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Comparison {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Arithmetic {
    pub(super) fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Arithmetic::Add => left + right,
            Arithmetic::Sub => left - right,
            Arithmetic::Mul => left * right,
            Arithmetic::Div => left / right,
            Arithmetic::Mod => left % right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Function {
    Last,
    Position,
    Count,
    Id,
    LocalName,
    NamespaceUri,
    Name,
    String,
    Concat,
    StartsWith,
    Contains,
    SubstringBefore,
    SubstringAfter,
    Substring,
    StringLength,
    NormalizeSpace,
    Translate,
    Boolean,
    Not,
    True,
    False,
    Lang,
    Number,
    Sum,
    Floor,
    Ceiling,
    Round,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "last" => Function::Last,
            "position" => Function::Position,
            "count" => Function::Count,
            "id" => Function::Id,
            "local-name" => Function::LocalName,
            "namespace-uri" => Function::NamespaceUri,
            "name" => Function::Name,
            "string" => Function::String,
            "concat" => Function::Concat,
            "starts-with" => Function::StartsWith,
            "contains" => Function::Contains,
            "substring-before" => Function::SubstringBefore,
            "substring-after" => Function::SubstringAfter,
            "substring" => Function::Substring,
            "string-length" => Function::StringLength,
            "normalize-space" => Function::NormalizeSpace,
            "translate" => Function::Translate,
            "boolean" => Function::Boolean,
            "not" => Function::Not,
            "true" => Function::True,
            "false" => Function::False,
            "lang" => Function::Lang,
            "number" => Function::Number,
            "sum" => Function::Sum,
            "floor" => Function::Floor,
            "ceiling" => Function::Ceiling,
            "round" => Function::Round,
            _ => return None,
        })
    }

    /// Accepted argument counts as `(min, max)`; `None` means unbounded.
    fn arity(self) -> (usize, Option<usize>) {
        use Function::*;
        match self {
            Last | Position | True | False => (0, Some(0)),
            Count | Id | Boolean | Not | Lang | Sum | Floor | Ceiling | Round => (1, Some(1)),
            LocalName | NamespaceUri | Name | String | StringLength | NormalizeSpace | Number => {
                (0, Some(1))
            }
            StartsWith | Contains | SubstringBefore | SubstringAfter => (2, Some(2)),
            Substring => (2, Some(3)),
            Translate => (3, Some(3)),
            Concat => (2, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(Comparison, Box<Expr>, Box<Expr>),
    Arithmetic(Arithmetic, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Literal(String),
    Number(f64),
    Call(Function, Vec<Expr>),
    Filter { primary: Box<Expr>, predicates: Vec<Expr> },
    Path { start: PathStart, steps: Vec<Step> },
}

/// Parses a complete expression. Leftover tokens are an error.
pub(super) fn parse(src: &str) -> Result<Expr, PathError> {
    let mut parser = Parser {
        src,
        tokens: tokenize(src)?,
        pos: 0,
    };
    let expr = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser<'s> {
    src: &'s str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), PathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> PathError {
        let found = self
            .tokens
            .get(self.pos)
            .and_then(|(_, offset)| self.src[*offset..].chars().next().map(|c| (c, *offset)));
        match found {
            Some((found, offset)) => PathError::UnexpectedChar { found, offset },
            None => PathError::UnexpectedEnd,
        }
    }

    fn expr(&mut self) -> Result<Expr, PathError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            left = Expr::Or(Box::new(left), Box::new(self.and_expr()?));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, PathError> {
        let mut left = self.equality()?;
        while self.eat(&Token::And) {
            left = Expr::And(Box::new(left), Box::new(self.equality()?));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, PathError> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => Comparison::Eq,
                Some(Token::NotEq) => Comparison::NotEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            left = Expr::Compare(op, Box::new(left), Box::new(self.relational()?));
        }
    }

    fn relational(&mut self) -> Result<Expr, PathError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => Comparison::Lt,
                Some(Token::Le) => Comparison::Le,
                Some(Token::Gt) => Comparison::Gt,
                Some(Token::Ge) => Comparison::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            left = Expr::Compare(op, Box::new(left), Box::new(self.additive()?));
        }
    }

    fn additive(&mut self) -> Result<Expr, PathError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Arithmetic::Add,
                Some(Token::Minus) => Arithmetic::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            left = Expr::Arithmetic(op, Box::new(left), Box::new(self.multiplicative()?));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, PathError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Multiply) => Arithmetic::Mul,
                Some(Token::Div) => Arithmetic::Div,
                Some(Token::Mod) => Arithmetic::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            left = Expr::Arithmetic(op, Box::new(left), Box::new(self.unary()?));
        }
    }

    fn unary(&mut self) -> Result<Expr, PathError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.unary()?)));
        }
        self.union()
    }

    fn union(&mut self) -> Result<Expr, PathError> {
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            left = Expr::Union(Box::new(left), Box::new(self.path_expr()?));
        }
        Ok(left)
    }

    fn path_expr(&mut self) -> Result<Expr, PathError> {
        let starts_filter = matches!(
            self.peek(),
            Some(
                Token::Variable(_)
                    | Token::LParen
                    | Token::Literal(_)
                    | Token::Number(_)
                    | Token::FunctionName(_)
            )
        );
        if !starts_filter {
            return self.location_path();
        }

        let primary = self.primary()?;
        let predicates = self.predicates()?;
        let filter = if predicates.is_empty() {
            primary
        } else {
            Expr::Filter {
                primary: Box::new(primary),
                predicates,
            }
        };

        let mut steps = Vec::new();
        if self.continue_path(&mut steps)? {
            self.relative_path(&mut steps)?;
            Ok(Expr::Path {
                start: PathStart::Filter(Box::new(filter)),
                steps,
            })
        } else {
            Ok(filter)
        }
    }

    /// Consumes a `/` or `//` separator, pushing the implied step for `//`.
    fn continue_path(&mut self, steps: &mut Vec<Step>) -> Result<bool, PathError> {
        if self.eat(&Token::Slash) {
            return Ok(true);
        }
        if self.eat(&Token::DoubleSlash) {
            steps.push(Step::abbreviated(Axis::DescendantOrSelf));
            return Ok(true);
        }
        Ok(false)
    }

    fn location_path(&mut self) -> Result<Expr, PathError> {
        let mut steps = Vec::new();
        let start = if self.eat(&Token::Slash) {
            if !self.starts_step() {
                return Ok(Expr::Path {
                    start: PathStart::Root,
                    steps,
                });
            }
            PathStart::Root
        } else if self.eat(&Token::DoubleSlash) {
            steps.push(Step::abbreviated(Axis::DescendantOrSelf));
            PathStart::Root
        } else {
            PathStart::Context
        };

        self.relative_path(&mut steps)?;
        Ok(Expr::Path { start, steps })
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::NameTest { .. }
                    | Token::NodeType(_)
                    | Token::AxisName(_)
                    | Token::FunctionName(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
            )
        )
    }

    fn relative_path(&mut self, steps: &mut Vec<Step>) -> Result<(), PathError> {
        steps.push(self.step()?);
        while self.continue_path(steps)? {
            steps.push(self.step()?);
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Step, PathError> {
        let axis = match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                return Ok(Step::abbreviated(Axis::SelfAxis));
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                return Ok(Step::abbreviated(Axis::Parent));
            }
            Some(Token::At) => {
                self.pos += 1;
                Axis::Attribute
            }
            Some(Token::AxisName(name)) => {
                let axis =
                    Axis::from_name(name).ok_or_else(|| PathError::UnknownAxis(name.clone()))?;
                self.pos += 1;
                self.expect(&Token::ColonColon)?;
                axis
            }
            _ => Axis::Child,
        };

        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, PathError> {
        match self.peek() {
            Some(Token::NameTest { .. }) => match self.advance() {
                Some(Token::NameTest { prefix, local }) => Ok(NodeTest::Name { prefix, local }),
                _ => Err(PathError::UnexpectedEnd),
            },
            Some(Token::NodeType(kind)) => {
                let kind = *kind;
                self.pos += 1;
                self.expect(&Token::LParen)?;
                let test = match kind {
                    NodeKind::Text => NodeTest::Text,
                    NodeKind::Comment => NodeTest::Comment,
                    NodeKind::Any => NodeTest::Node,
                    NodeKind::ProcessingInstruction => match self.peek() {
                        Some(Token::Literal(target)) => {
                            let target = target.clone();
                            self.pos += 1;
                            NodeTest::ProcessingInstruction(Some(target))
                        }
                        _ => NodeTest::ProcessingInstruction(None),
                    },
                };
                self.expect(&Token::RParen)?;
                Ok(test)
            }
            Some(Token::FunctionName(name)) => Err(PathError::UnknownNodeTest(name.clone())),
            _ => Err(self.unexpected()),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, PathError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            predicates.push(self.expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(predicates)
    }

    fn primary(&mut self) -> Result<Expr, PathError> {
        let Some(token) = self.advance() else {
            return Err(PathError::UnexpectedEnd);
        };
        match token {
            Token::Variable(name) => Err(PathError::UnboundVariable(name)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Literal(value) => Ok(Expr::Literal(value)),
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::FunctionName(name) => self.call(name),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, PathError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }

        let function =
            Function::from_name(&name).ok_or_else(|| PathError::UnknownFunction(name.clone()))?;
        let (min, max) = function.arity();
        if args.len() < min || max.map_or(false, |max| args.len() > max) {
            return Err(PathError::ArgumentCount {
                function: name,
                found: args.len(),
            });
        }
        Ok(Expr::Call(function, args))
    }
}
