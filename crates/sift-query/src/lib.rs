//! Search query parsing for sift.
//!
//! Turns a human-written search string into a predicate tree and a flat list
//! of conditions:
//!
//! - **Terms**: `rust` - words to look for
//! - **Phrases**: `"error handling"` - exact text
//! - **Regexes**: `/^v\d+/` - patterns
//! - **Fields**: `author:Tolkien`, `title:"The Hobbit"` - field-scoped terms
//! - **Comparisons**: `price>=10`, `created<2024-06` - numbers and dates
//! - **Ranges**: `price:10..20`, `created:2024-01..2024-03` - inclusive bounds
//! - **Operators**: `AND`, `OR`, `&`, `|` - one precedence level, left to right
//! - **Negation**: `-draft`, `!(a OR b)` - leaves and groups
//!
//! Parsing never fails. Unrecognized text, rejected keys and (in strict mode)
//! impossible literals are reported in [`ParseMetadata::errors`] while the
//! rest of the query is still parsed.
//!
//! # Example
//!
//! ```
//! use sift_query::parse;
//!
//! let result = parse("author:Tolkien -title:\"The Hobbit\"");
//! assert!(!result.has_errors());
//! assert_eq!(result.ast_conditions.len(), 2);
//! assert!(result.ast_conditions[1].is_negated);
//! ```

#![warn(missing_docs)]

mod ast;
mod condition;
mod config;
mod error;
mod instant;
mod lexer;
mod normalize;
mod parser;
mod query;
mod result;

pub use ast::{AstNode, BinaryNode, BoolOp, ConditionNode, ConditionValue, TermKind};
pub use condition::{AstCondition, extract};
pub use config::ParserConfig;
pub use error::{ParseError, ParseErrorKind};
pub use instant::format_instant;
pub use lexer::{Comparison, LogicalOperator, Token, TokenKind, TokenStream, tokenize};
pub use normalize::normalize;
pub use parser::build;
pub use query::{QueryParser, parse};
pub use result::{ParseMetadata, ParseResult};
