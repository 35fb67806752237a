use miette::Diagnostic;
use thiserror::Error;

use kiln_util::errors::KilnError;

/// Errors raised while compiling or evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum QueryError {
    /// An operand is not a `key=value` term.
    #[error("Invalid expression: {0}")]
    #[diagnostic(help("Terms look like key=value, e.g. os=Linux or options.shared=True"))]
    InvalidExpression(String),

    /// A `)` without its `(`, or a `(` never closed.
    #[error("Unbalanced parentheses in query '{0}'")]
    UnbalancedParentheses(String),

    /// The program did not reduce to exactly one value.
    #[error("Bad stack evaluating query '{program}': {reason}")]
    BadStack { program: String, reason: String },
}

impl From<QueryError> for KilnError {
    fn from(e: QueryError) -> Self {
        KilnError::Query {
            message: e.to_string(),
        }
    }
}
