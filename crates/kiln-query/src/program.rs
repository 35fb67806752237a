//! Infix query compilation and postfix evaluation.
//!
//! Operators have no precedence. Operators seen inside one parenthesis level
//! are held until that level closes and are then emitted in the order they
//! appeared; at the end of input the outermost operators are emitted the
//! same way. Fully parenthesised expressions therefore evaluate as written,
//! but mixing `AND` and `OR` at one level does not follow the usual
//! precedence rules, so such expressions should be parenthesised.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::errors::QueryError;

/// One element of a compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A `key=value` term, quotes kept as written.
    Term(String),
    And,
    Or,
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Term(term) => term,
            Token::And => "&",
            Token::Or => "|",
        }
    }

    fn word_operator(word: &str) -> Option<Token> {
        match word {
            "AND" | "and" => Some(Token::And),
            "OR" | "or" => Some(Token::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Pending {
    Open,
    Operator(Token),
}

enum Operand<'a> {
    Term(&'a str),
    Value(bool),
}

impl Operand<'_> {
    fn value<F: FnMut(&str) -> bool>(self, evaluator: &mut F) -> bool {
        match self {
            Operand::Value(v) => v,
            Operand::Term(term) => evaluator(&*unquote(term)),
        }
    }
}

/// A compiled query: operands and operators in postfix order.
///
/// Immutable once built; compile once and evaluate against many records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostfixProgram {
    tokens: Vec<Token>,
}

impl PostfixProgram {
    /// Compile an infix expression.
    ///
    /// An empty or blank expression yields an empty program, which matches
    /// everything.
    pub fn compile(expression: &str) -> Result<Self, QueryError> {
        let mut tokens = Vec::new();
        let mut stack: Vec<Pending> = Vec::new();
        let mut chars = expression.char_indices().peekable();

        while let Some(&(start, c)) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                '(' => {
                    chars.next();
                    stack.push(Pending::Open);
                }
                ')' => {
                    chars.next();
                    let mut group = Vec::new();
                    loop {
                        match stack.pop() {
                            Some(Pending::Open) => break,
                            Some(Pending::Operator(op)) => group.push(op),
                            None => {
                                return Err(QueryError::UnbalancedParentheses(
                                    expression.to_string(),
                                ))
                            }
                        }
                    }
                    tokens.extend(group.into_iter().rev());
                }
                '&' => {
                    chars.next();
                    stack.push(Pending::Operator(Token::And));
                }
                '|' => {
                    chars.next();
                    stack.push(Pending::Operator(Token::Or));
                }
                _ => {
                    let mut end = start;
                    let mut quoted = false;
                    while let Some(&(i, c)) = chars.peek() {
                        if !quoted && (c.is_whitespace() || matches!(c, '&' | '|' | '(' | ')')) {
                            break;
                        }
                        if c == '"' || c == '\'' {
                            quoted = !quoted;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                    }
                    let word = &expression[start..end];
                    if let Some(op) = Token::word_operator(word) {
                        stack.push(Pending::Operator(op));
                    } else if word.contains('=') {
                        tokens.push(Token::Term(word.to_string()));
                    } else {
                        return Err(QueryError::InvalidExpression(word.to_string()));
                    }
                }
            }
        }

        for pending in stack {
            match pending {
                Pending::Open => {
                    return Err(QueryError::UnbalancedParentheses(expression.to_string()))
                }
                Pending::Operator(op) => tokens.push(op),
            }
        }

        let program = Self { tokens };
        debug!("compiled query '{expression}' to [{program}]");
        Ok(program)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens as plain strings, operators rendered as `&` and `|`.
    pub fn to_strings(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.as_str().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Evaluate the program, resolving each term through `evaluator`.
    ///
    /// `evaluator` receives `key=value` with the value's quotes removed. Both
    /// sides of every operator are evaluated; there is no short-circuiting.
    /// An empty program is `true` without calling `evaluator`.
    pub fn evaluate<F>(&self, mut evaluator: F) -> Result<bool, QueryError>
    where
        F: FnMut(&str) -> bool,
    {
        if self.tokens.is_empty() {
            return Ok(true);
        }

        let mut stack: Vec<Operand<'_>> = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Term(term) => stack.push(Operand::Term(term.as_str())),
                Token::And | Token::Or => {
                    let right = self.pop(&mut stack)?;
                    let left = self.pop(&mut stack)?;
                    let left = left.value(&mut evaluator);
                    let right = right.value(&mut evaluator);
                    let combined = match token {
                        Token::And => left & right,
                        _ => left | right,
                    };
                    stack.push(Operand::Value(combined));
                }
            }
        }

        if stack.len() != 1 {
            return Err(self.bad_stack(format!("{} values left", stack.len())));
        }
        let last = self.pop(&mut stack)?;
        Ok(last.value(&mut evaluator))
    }

    fn pop<'a>(&self, stack: &mut Vec<Operand<'a>>) -> Result<Operand<'a>, QueryError> {
        stack
            .pop()
            .ok_or_else(|| self.bad_stack("operator is missing an operand".to_string()))
    }

    fn bad_stack(&self, reason: String) -> QueryError {
        QueryError::BadStack {
            program: self.to_string(),
            reason,
        }
    }
}

/// Split a term at its first `=` and strip quotes from the value.
pub fn split_term(term: &str) -> (&str, &str) {
    match term.split_once('=') {
        Some((key, value)) => (key, value.trim_matches(|c: char| c == '"' || c == '\'')),
        None => (term, ""),
    }
}

fn unquote(term: &str) -> Cow<'_, str> {
    let (key, value) = split_term(term);
    if key.len() + 1 + value.len() == term.len() {
        Cow::Borrowed(term)
    } else {
        Cow::Owned(format!("{key}={value}"))
    }
}

impl fmt::Display for PostfixProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl FromStr for PostfixProgram {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
