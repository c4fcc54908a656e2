//! Tree builder.
//!
//! Folds the cleaned token stream into a binary tree.
//!
//! # Grammar
//!
//! ```text
//! expression → term ( operator? term )*
//! term       → negation? ( group | leaf )
//! group      → "(" expression ")"
//! ```
//!
//! AND and OR share one precedence level and associate to the left, so
//! `a OR b AND c` is `(a OR b) AND c`. A missing operator means AND.
//!
//! Groups are tracked on an explicit frame stack instead of the call stack,
//! so nesting depth is bounded only by memory. The builder is total: stray
//! close parens and leading operators are ignored, and unclosed groups are
//! closed at the end of input.

use std::mem;

use tracing::trace;

use crate::{
    ast::{AstNode, BoolOp, ConditionNode},
    lexer::{Token, TokenKind},
};

/// An expression under construction, one per open group.
#[derive(Debug, Default)]
struct Frame {
    /// Everything combined so far.
    acc: Option<AstNode>,
    /// Operator waiting for its right operand.
    pending: Option<BoolOp>,
    /// The group itself is negated.
    negated: bool,
}

/// Builds a tree from a token stream.
struct Parser<'a> {
    /// Token stream to parse.
    tokens: &'a [Token],
    /// Open groups; the first frame is the top level.
    frames: Vec<Frame>,
    /// A negation marker is waiting for its operand.
    pending_negation: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a cleaned token stream.
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            frames: vec![Frame::default()],
            pending_negation: false,
        }
    }

    /// Consumes every token and returns the tree, if any term survived.
    fn parse(mut self) -> Option<AstNode> {
        for token in self.tokens {
            match &token.kind {
                TokenKind::Negation => self.pending_negation = true,
                TokenKind::Operator { value } => {
                    let frame = self.current();
                    if frame.acc.is_some() {
                        frame.pending = Some(BoolOp::from(*value));
                    }
                }
                TokenKind::OpenParen { negated } => {
                    let negated = *negated || mem::take(&mut self.pending_negation);
                    self.frames.push(Frame {
                        negated,
                        ..Frame::default()
                    });
                }
                TokenKind::CloseParen => {
                    self.pending_negation = false;
                    if self.frames.len() > 1 {
                        self.close_group();
                    } else {
                        trace!(position = token.position, "ignored unmatched close paren");
                    }
                }
                _ => {
                    let negated = mem::take(&mut self.pending_negation);
                    if let Some(leaf) = ConditionNode::from_token(token.clone(), negated) {
                        self.attach(AstNode::Condition(leaf));
                    }
                }
            }
        }

        while self.frames.len() > 1 {
            self.close_group();
        }
        self.frames.pop().and_then(|frame| frame.acc)
    }

    /// Returns the innermost open frame.
    fn current(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Combines `node` into the innermost frame.
    fn attach(&mut self, node: AstNode) {
        let frame = self.current();
        let operator = frame.pending.take().unwrap_or(BoolOp::And);
        frame.acc = Some(match frame.acc.take() {
            Some(left) => AstNode::binary(operator, left, node),
            None => node,
        });
    }

    /// Pops the innermost group and attaches its expression to the enclosing one.
    fn close_group(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if let Some(mut node) = frame.acc {
            if frame.negated {
                node.negate();
            }
            self.attach(node);
        }
    }
}

/// Builds a tree from a cleaned token stream. Returns `None` when no term survives.
pub fn build(tokens: &[Token]) -> Option<AstNode> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ParserConfig, lexer::tokenize};

    fn tree(input: &str) -> Option<AstNode> {
        build(&tokenize(input, &ParserConfig::default()).tokens)
    }

    fn render(input: &str) -> String {
        tree(input).map(|t| t.to_string()).unwrap_or_default()
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(tree(""), None);
        assert_eq!(tree("()"), None);
        assert_eq!(tree("AND OR"), None);
    }

    #[test]
    fn single_leaf() {
        assert_eq!(render("hello"), "word hello\n");
    }

    #[test]
    fn implicit_and() {
        assert_eq!(render("hello world"), "AND\n  word hello\n  word world\n");
    }

    #[test]
    fn one_precedence_level_left_associative() {
        assert_eq!(
            render("a OR b AND c"),
            "AND\n  OR\n    word a\n    word b\n  word c\n"
        );
        assert_eq!(
            render("a AND b OR c"),
            "OR\n  AND\n    word a\n    word b\n  word c\n"
        );
    }

    #[test]
    fn groups_override_associativity() {
        assert_eq!(
            render("a OR (b AND c)"),
            "OR\n  word a\n  AND\n    word b\n    word c\n"
        );
    }

    #[test]
    fn leading_operator_ignored() {
        assert_eq!(render("OR a | b"), "OR\n  word a\n  word b\n");
    }

    #[test]
    fn trailing_operator_ignored() {
        assert_eq!(render("a b AND"), "AND\n  word a\n  word b\n");
    }

    #[test]
    fn negated_leaf() {
        assert_eq!(render("-a b"), "AND\n  NOT word a\n  word b\n");
    }

    #[test]
    fn double_negation_is_not_inverted() {
        assert_eq!(render("- -a"), "NOT word a\n");
    }

    #[test]
    fn negated_group() {
        assert_eq!(render("-(a b)"), "NOT AND\n  word a\n  word b\n");
        assert_eq!(render("! (a b)"), "NOT AND\n  word a\n  word b\n");
    }

    #[test]
    fn group_negation_composes_with_inner_flag() {
        assert_eq!(render("-(-a)"), "NOT word a\n");
    }

    #[test]
    fn unclosed_group_is_closed() {
        assert_eq!(render("-(a OR b"), "NOT OR\n  word a\n  word b\n");
    }

    #[test]
    fn stray_close_is_ignored() {
        assert_eq!(render("a ) b"), "AND\n  word a\n  word b\n");
    }

    #[test]
    fn deep_nesting() {
        let depth = 10_000;
        let query = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(render(&query), "word a\n");
    }

    #[test]
    fn negated_date_range_negates_both_bounds() {
        let rendered = render("-created:2024");
        assert!(rendered.starts_with("NOT AND\n"));
        assert!(rendered.contains("  keyword_date created >= 2024-01-01T00:00:00.000Z\n"));
        assert!(rendered.contains("  keyword_date created <= 2024-12-31T23:59:59.999Z\n"));
    }
}
