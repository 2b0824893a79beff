//! Keyword recognition. ES|QL keywords are case-insensitive.
//!
//! Sort modifiers (`ASC`, `NULLS FIRST`, ...) and time-span units are not
//! reserved; the parser recognises them contextually so they stay usable as
//! column names.

use super::token::TokenKind;

/// Looks up a keyword by name (case-insensitive).
pub fn lookup_keyword(name: &str) -> Option<TokenKind> {
    match name.to_ascii_uppercase().as_str() {
        "FROM" => Some(TokenKind::From),
        "ROW" => Some(TokenKind::Row),
        "EVAL" => Some(TokenKind::Eval),
        "WHERE" => Some(TokenKind::Where),
        "STATS" => Some(TokenKind::Stats),
        "BY" => Some(TokenKind::By),
        "SORT" => Some(TokenKind::Sort),
        "LIMIT" => Some(TokenKind::Limit),
        "KEEP" => Some(TokenKind::Keep),
        "DROP" => Some(TokenKind::Drop),

        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        "IN" => Some(TokenKind::In),
        "LIKE" => Some(TokenKind::Like),
        "RLIKE" => Some(TokenKind::Rlike),
        "IS" => Some(TokenKind::Is),

        "NULL" => Some(TokenKind::Null),
        "TRUE" => Some(TokenKind::True),
        "FALSE" => Some(TokenKind::False),

        _ => None,
    }
}

/// Returns true if `name` is a reserved keyword.
pub fn is_reserved_word(name: &str) -> bool {
    lookup_keyword(name).is_some()
}
