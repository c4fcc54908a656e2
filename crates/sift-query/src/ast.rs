//! Query AST types.
//!
//! The tree is binary: every operator node has exactly two children, and
//! leaves are single conditions. Negation is a flag on the node it applies to.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    instant,
    lexer::{Comparison, LogicalOperator, Token, TokenKind},
};

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AstNode {
    /// Two subtrees joined by AND or OR.
    Binary(BinaryNode),
    /// A single condition.
    Condition(ConditionNode),
}

impl AstNode {
    /// Returns this node's own negation flag.
    pub fn negated(&self) -> bool {
        match self {
            Self::Binary(node) => node.negated,
            Self::Condition(node) => node.negated,
        }
    }

    /// Sets the negation flag, composing with any flag already present.
    pub fn negate(&mut self) {
        match self {
            Self::Binary(node) => node.negated = true,
            Self::Condition(node) => node.negated = true,
        }
    }

    /// Joins two subtrees.
    pub fn binary(operator: BoolOp, left: Self, right: Self) -> Self {
        Self::Binary(BinaryNode {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            negated: false,
        })
    }

    /// Formats the node as a tree with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let not = if self.negated() { "NOT " } else { "" };
        match self {
            Self::Binary(node) => {
                writeln!(f, "{prefix}{not}{}", node.operator)?;
                node.left.fmt_tree(f, indent + 1)?;
                node.right.fmt_tree(f, indent + 1)
            }
            Self::Condition(node) => writeln!(f, "{prefix}{not}{node}"),
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// Boolean connective of a [`BinaryNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoolOp {
    /// Both sides must hold.
    #[serde(rename = "AND")]
    And,
    /// Either side must hold.
    #[serde(rename = "OR")]
    Or,
}

impl From<LogicalOperator> for BoolOp {
    fn from(operator: LogicalOperator) -> Self {
        if operator.is_disjunction() {
            Self::Or
        } else {
            Self::And
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Two subtrees joined by a boolean operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryNode {
    /// How the children combine.
    pub operator: BoolOp,
    /// Left operand.
    pub left: Box<AstNode>,
    /// Right operand.
    pub right: Box<AstNode>,
    /// The combined result is inverted.
    pub negated: bool,
}

/// The kind of term a condition was written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Bare word.
    Word,
    /// Quoted phrase.
    Phrase,
    /// Regular expression.
    Regex,
    /// `key:word`
    Keyword,
    /// `key:"phrase"`
    KeywordPhrase,
    /// `key:/regex/`
    KeywordRegex,
    /// Numeric comparison.
    KeywordNumeric,
    /// Date comparison.
    KeywordDate,
}

impl TermKind {
    /// Returns the snake_case name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Phrase => "phrase",
            Self::Regex => "regex",
            Self::Keyword => "keyword",
            Self::KeywordPhrase => "keyword_phrase",
            Self::KeywordRegex => "keyword_regex",
            Self::KeywordNumeric => "keyword_numeric",
            Self::KeywordDate => "keyword_date",
        }
    }

    /// The value is a regular expression.
    pub fn is_regex(self) -> bool {
        matches!(self, Self::Regex | Self::KeywordRegex)
    }

    /// The value is a number.
    pub fn is_numeric(self) -> bool {
        self == Self::KeywordNumeric
    }

    /// The value is an instant.
    pub fn is_date(self) -> bool {
        self == Self::KeywordDate
    }

    /// The value is a quoted phrase.
    pub fn is_phrase(self) -> bool {
        matches!(self, Self::Phrase | Self::KeywordPhrase)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value a condition tests against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Word, phrase or regex text.
    Text(String),
    /// A number.
    Number(f64),
    /// An instant, serialized as RFC 3339 with milliseconds.
    Date(#[serde(serialize_with = "instant::serialize")] DateTime<Utc>),
}

impl ConditionValue {
    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) | Self::Date(_) => None,
        }
    }

    /// Returns true for empty text. Numbers and dates are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Returns true for empty text and numeric zero.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Number(number) => *number == 0.0,
            Self::Date(_) => false,
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Date(date) => f.write_str(&instant::format_instant(date)),
        }
    }
}

/// A single condition from one term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionNode {
    /// How the term was written.
    pub token_kind: TermKind,
    /// Field the condition applies to; `None` means any field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value to test.
    pub value: ConditionValue,
    /// Comparison for numeric and date conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Comparison>,
    /// Character offset of the term.
    pub position: usize,
    /// The condition is inverted.
    pub negated: bool,
}

impl ConditionNode {
    /// Builds a condition from a term token. Structural tokens yield `None`.
    pub fn from_token(token: Token, negated: bool) -> Option<Self> {
        let (token_kind, key, value, operator) = match token.kind {
            TokenKind::Word { value } => (TermKind::Word, None, ConditionValue::Text(value), None),
            TokenKind::Phrase { value } => {
                (TermKind::Phrase, None, ConditionValue::Text(value), None)
            }
            TokenKind::Regex { value } => {
                (TermKind::Regex, None, ConditionValue::Text(value), None)
            }
            TokenKind::Keyword { key, value } => (
                TermKind::Keyword,
                Some(key),
                ConditionValue::Text(value),
                None,
            ),
            TokenKind::KeywordPhrase { key, value } => (
                TermKind::KeywordPhrase,
                Some(key),
                ConditionValue::Text(value),
                None,
            ),
            TokenKind::KeywordRegex { key, value } => (
                TermKind::KeywordRegex,
                Some(key),
                ConditionValue::Text(value),
                None,
            ),
            TokenKind::KeywordNumeric {
                key,
                operator,
                value,
            } => (
                TermKind::KeywordNumeric,
                Some(key),
                ConditionValue::Number(value),
                Some(operator),
            ),
            TokenKind::KeywordDate {
                key,
                operator,
                value,
            } => (
                TermKind::KeywordDate,
                Some(key),
                ConditionValue::Date(value),
                Some(operator),
            ),
            TokenKind::Operator { .. }
            | TokenKind::OpenParen { .. }
            | TokenKind::CloseParen
            | TokenKind::Negation => return None,
        };

        Some(Self {
            token_kind,
            key,
            value,
            operator,
            position: token.position,
            negated,
        })
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_kind)?;
        if let Some(key) = &self.key {
            write!(f, " {key}")?;
        }
        if let Some(operator) = self.operator {
            write!(f, " {operator}")?;
        }
        match &self.value {
            ConditionValue::Text(text) if self.token_kind.is_phrase() => write!(f, " {text:?}"),
            ConditionValue::Text(text) if self.token_kind.is_regex() => write!(f, " /{text}/"),
            value => write!(f, " {value}"),
        }
    }
}
