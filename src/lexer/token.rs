//! Token types for ES|QL lexical analysis.

use crate::ast::Span;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Source and processing commands
    From,
    Row,
    Eval,
    Where,
    Stats,
    By,
    Sort,
    Limit,
    Keep,
    Drop,

    // Logical and predicate keywords
    And,
    Or,
    Not,
    In,
    Like,
    Rlike,
    Is,

    // Keyword literals
    Null,
    True,
    False,

    // Identifiers
    Identifier(SmolStr),
    QuotedIdentifier(SmolStr), // `name`

    // Literals
    StringLiteral(SmolStr),
    IntegerLiteral(SmolStr),
    DecimalLiteral(SmolStr),
    /// `?` (empty name) or `?name`.
    Parameter(SmolStr),

    // Operators
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Percent,     // %
    Assign,      // =
    EqEq,        // ==
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    DoubleColon, // ::

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Pipe,     // |

    Eof,
}

impl TokenKind {
    /// Returns true if this token kind is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::From
                | TokenKind::Row
                | TokenKind::Eval
                | TokenKind::Where
                | TokenKind::Stats
                | TokenKind::By
                | TokenKind::Sort
                | TokenKind::Limit
                | TokenKind::Keep
                | TokenKind::Drop
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::In
                | TokenKind::Like
                | TokenKind::Rlike
                | TokenKind::Is
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Returns true for tokens that start a pipeline command.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            TokenKind::From
                | TokenKind::Row
                | TokenKind::Eval
                | TokenKind::Where
                | TokenKind::Stats
                | TokenKind::Sort
                | TokenKind::Limit
                | TokenKind::Keep
                | TokenKind::Drop
        )
    }

    /// Returns true for literal tokens.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral(_)
                | TokenKind::IntegerLiteral(_)
                | TokenKind::DecimalLiteral(_)
                | TokenKind::Parameter(_)
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::From => write!(f, "FROM"),
            TokenKind::Row => write!(f, "ROW"),
            TokenKind::Eval => write!(f, "EVAL"),
            TokenKind::Where => write!(f, "WHERE"),
            TokenKind::Stats => write!(f, "STATS"),
            TokenKind::By => write!(f, "BY"),
            TokenKind::Sort => write!(f, "SORT"),
            TokenKind::Limit => write!(f, "LIMIT"),
            TokenKind::Keep => write!(f, "KEEP"),
            TokenKind::Drop => write!(f, "DROP"),
            TokenKind::And => write!(f, "AND"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::In => write!(f, "IN"),
            TokenKind::Like => write!(f, "LIKE"),
            TokenKind::Rlike => write!(f, "RLIKE"),
            TokenKind::Is => write!(f, "IS"),
            TokenKind::Null => write!(f, "NULL"),
            TokenKind::True => write!(f, "TRUE"),
            TokenKind::False => write!(f, "FALSE"),
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::QuotedIdentifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::StringLiteral(_) => write!(f, "string literal"),
            TokenKind::IntegerLiteral(text) | TokenKind::DecimalLiteral(text) => {
                write!(f, "number '{text}'")
            }
            TokenKind::Parameter(name) => write!(f, "parameter '?{name}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::DoubleColon => write!(f, "'::'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its location in the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the source slice covered by this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_classification() {
        assert!(TokenKind::Stats.is_keyword());
        assert!(TokenKind::Rlike.is_keyword());
        assert!(!TokenKind::Identifier("avg".into()).is_keyword());
        assert!(!TokenKind::Plus.is_keyword());
    }

    #[test]
    fn command_classification() {
        assert!(TokenKind::Eval.is_command());
        assert!(TokenKind::Keep.is_command());
        assert!(!TokenKind::By.is_command());
        assert!(!TokenKind::And.is_command());
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(TokenKind::Pipe.to_string(), "'|'");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
        assert_eq!(
            TokenKind::Identifier("foo".into()).to_string(),
            "identifier 'foo'"
        );
    }

    #[test]
    fn token_slice_reads_source() {
        let token = Token::new(TokenKind::Eval, 9..13);
        assert_eq!(token.slice("FROM a | EVAL x"), "EVAL");
        assert_eq!(Token::new(TokenKind::Eof, 40..40).slice("short"), "");
    }
}
