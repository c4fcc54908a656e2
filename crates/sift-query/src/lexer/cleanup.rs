//! Token stream cleanup between lexing and tree building.

use tracing::trace;

use super::{Token, TokenKind};

/// Removes empty groups and stray operators until nothing changes.
///
/// Each pass drops:
/// - an open paren immediately followed by a close paren, with any negation
///   in front of it
/// - an operator directly after another operator (the first one is kept)
/// - an operator directly before a close paren
/// - an operator directly after an open paren
pub(super) fn cleanup(mut tokens: Vec<Token>) -> Vec<Token> {
    loop {
        let before = tokens.len();
        tokens = pass(tokens);
        if tokens.len() == before {
            return tokens;
        }
        trace!(removed = before - tokens.len(), "cleanup pass");
    }
}

/// One left-to-right cleanup pass.
fn pass(tokens: Vec<Token>) -> Vec<Token> {
    let mut kept: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let next = iter.peek().map(|t| &t.kind);
        match token.kind {
            TokenKind::OpenParen { .. } if next == Some(&TokenKind::CloseParen) => {
                iter.next();
                if kept.last().is_some_and(|t| t.kind == TokenKind::Negation) {
                    kept.pop();
                }
            }
            TokenKind::Operator { .. } => {
                let follows_operator_or_open = kept.last().is_some_and(|t| {
                    matches!(
                        t.kind,
                        TokenKind::Operator { .. } | TokenKind::OpenParen { .. }
                    )
                });
                let precedes_close = next == Some(&TokenKind::CloseParen);
                if !follows_operator_or_open && !precedes_close {
                    kept.push(token);
                }
            }
            _ => kept.push(token),
        }
    }
    kept
}
