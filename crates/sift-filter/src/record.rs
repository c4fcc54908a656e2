//! Evaluating a parsed query against JSON records.
//!
//! The query tree is compiled once into a [`Predicate`] tree with regexes
//! built and text lowered, then evaluated per record.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use sift_query::{AstNode, BoolOp, Comparison, ConditionNode, ConditionValue, ParseResult};
use tracing::debug;

use crate::{
    error::FilterError,
    sort::{SortKey, is_sort_marker, sort_keys, sort_records},
    value::{as_instant, as_number, as_text, lookup, scalars, type_name},
};

/// Options for record evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Match text and regexes case-sensitively.
    pub case_sensitive: bool,
}

/// How a single condition tests one scalar.
#[derive(Debug, Clone)]
enum Matcher {
    /// Substring match; the needle is lowered unless case-sensitive.
    Text(String),
    /// Regex search.
    Regex(Regex),
    /// Numeric comparison.
    Number(Comparison, f64),
    /// Date comparison.
    Date(Comparison, DateTime<Utc>),
}

/// A compiled query tree.
#[derive(Debug, Clone)]
enum Predicate {
    /// Both or either side, optionally inverted.
    Binary {
        /// How the sides combine.
        operator: BoolOp,
        /// Left side.
        left: Box<Predicate>,
        /// Right side.
        right: Box<Predicate>,
        /// Invert the combined result.
        negated: bool,
    },
    /// One condition, optionally inverted.
    Leaf {
        /// Field to read; `None` tries every top-level field.
        key: Option<String>,
        /// Test applied to each scalar of the field.
        matcher: Matcher,
        /// Invert the result.
        negated: bool,
    },
}

impl Predicate {
    /// Flips the inversion flag.
    fn negate(self) -> Self {
        match self {
            Self::Binary {
                operator,
                left,
                right,
                negated,
            } => Self::Binary {
                operator,
                left,
                right,
                negated: !negated,
            },
            Self::Leaf {
                key,
                matcher,
                negated,
            } => Self::Leaf {
                key,
                matcher,
                negated: !negated,
            },
        }
    }
}

/// A parsed query prepared for evaluation against records.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    /// Compiled tree; `None` matches everything.
    predicate: Option<Predicate>,
    /// Sort order from `asc:`/`desc:` markers.
    sort: Vec<SortKey>,
    /// Evaluation options.
    options: FilterOptions,
}

impl RecordFilter {
    /// Prepares `result` for evaluation, compiling every regex up front.
    pub fn new(result: &ParseResult, options: FilterOptions) -> Result<Self, FilterError> {
        let predicate = result
            .ast
            .as_ref()
            .map(|ast| compile(ast, options))
            .transpose()?
            .flatten();
        let sort = sort_keys(&result.ast_conditions);
        debug!(
            sort_keys = sort.len(),
            case_sensitive = options.case_sensitive,
            "prepared record filter"
        );
        Ok(Self {
            predicate,
            sort,
            options,
        })
    }

    /// Returns the sort order collected from the query.
    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    /// Returns true if `record` satisfies the query. An empty query matches everything.
    pub fn matches(&self, record: &Value) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| self.eval(predicate, record))
    }

    /// Keeps the matching records, then sorts them.
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        let total = records.len();
        let mut kept: Vec<Value> = records.into_iter().filter(|r| self.matches(r)).collect();
        sort_records(&mut kept, &self.sort);
        debug!(total, kept = kept.len(), "filtered records");
        kept
    }

    /// Applies the filter to a JSON array of records.
    pub fn apply_json(&self, input: Value) -> Result<Vec<Value>, FilterError> {
        match input {
            Value::Array(records) => Ok(self.apply(records)),
            other => Err(FilterError::NotAnArray {
                found: type_name(&other),
            }),
        }
    }

    /// Evaluates a compiled node.
    fn eval(&self, predicate: &Predicate, record: &Value) -> bool {
        match predicate {
            Predicate::Binary {
                operator,
                left,
                right,
                negated,
            } => {
                let combined = match operator {
                    BoolOp::And => self.eval(left, record) && self.eval(right, record),
                    BoolOp::Or => self.eval(left, record) || self.eval(right, record),
                };
                combined != *negated
            }
            Predicate::Leaf {
                key,
                matcher,
                negated,
            } => self.eval_leaf(key.as_deref(), matcher, record) != *negated,
        }
    }

    /// Tests a condition against the named field, or every top-level field.
    fn eval_leaf(&self, key: Option<&str>, matcher: &Matcher, record: &Value) -> bool {
        match key {
            Some(key) => lookup(record, key).is_some_and(|field| self.test_field(matcher, field)),
            None => match record {
                Value::Object(fields) => fields.values().any(|field| self.test_field(matcher, field)),
                scalar => self.test_field(matcher, scalar),
            },
        }
    }

    /// Tests every scalar of a field; any match counts.
    fn test_field(&self, matcher: &Matcher, field: &Value) -> bool {
        scalars(field)
            .into_iter()
            .any(|scalar| self.test_scalar(matcher, scalar))
    }

    /// Tests one scalar.
    fn test_scalar(&self, matcher: &Matcher, scalar: &Value) -> bool {
        match matcher {
            Matcher::Text(needle) => as_text(scalar).is_some_and(|text| {
                if self.options.case_sensitive {
                    text.contains(needle.as_str())
                } else {
                    text.to_lowercase().contains(needle.as_str())
                }
            }),
            Matcher::Regex(regex) => as_text(scalar).is_some_and(|text| regex.is_match(&text)),
            Matcher::Number(operator, expected) => {
                as_number(scalar).is_some_and(|actual| operator.holds(&actual, expected))
            }
            Matcher::Date(operator, expected) => {
                as_instant(scalar).is_some_and(|actual| operator.holds(&actual, expected))
            }
        }
    }
}

/// Compiles a query tree into a predicate tree.
///
/// Sort markers compile to nothing. AND or OR with one missing side is the
/// other side (carrying the group's negation), and a group with no sides left
/// is missing too.
fn compile(node: &AstNode, options: FilterOptions) -> Result<Option<Predicate>, FilterError> {
    match node {
        AstNode::Binary(binary) => {
            let left = compile(&binary.left, options)?;
            let right = compile(&binary.right, options)?;
            Ok(match (left, right) {
                (Some(l), Some(r)) => Some(Predicate::Binary {
                    operator: binary.operator,
                    left: Box::new(l),
                    right: Box::new(r),
                    negated: binary.negated,
                }),
                (Some(one), None) | (None, Some(one)) if binary.negated => Some(one.negate()),
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            })
        }
        AstNode::Condition(leaf) => compile_leaf(leaf, options),
    }
}

/// Compiles a single condition; sort markers yield `None`.
fn compile_leaf(
    leaf: &ConditionNode,
    options: FilterOptions,
) -> Result<Option<Predicate>, FilterError> {
    if is_sort_marker(leaf.key.as_deref()) {
        return Ok(None);
    }

    let matcher = match (&leaf.value, leaf.operator) {
        (ConditionValue::Number(n), operator) => {
            Matcher::Number(operator.unwrap_or(Comparison::Eq), *n)
        }
        (ConditionValue::Date(d), operator) => Matcher::Date(operator.unwrap_or(Comparison::Eq), *d),
        (ConditionValue::Text(pattern), _) if leaf.token_kind.is_regex() => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!options.case_sensitive)
                .build()
                .map_err(|source| FilterError::InvalidRegex {
                    pattern: pattern.clone(),
                    position: leaf.position,
                    source,
                })?;
            Matcher::Regex(regex)
        }
        (ConditionValue::Text(text), _) => Matcher::Text(if options.case_sensitive {
            text.clone()
        } else {
            text.to_lowercase()
        }),
    };

    Ok(Some(Predicate::Leaf {
        key: leaf.key.clone(),
        matcher,
        negated: leaf.negated,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sift_query::parse;

    use super::*;

    fn filter(query: &str) -> RecordFilter {
        RecordFilter::new(&parse(query), FilterOptions::default()).unwrap()
    }

    fn book() -> Value {
        json!({
            "title": "The Hobbit",
            "author": "J.R.R. Tolkien",
            "price": 12.5,
            "tags": ["fantasy", "classic"],
            "created": "1937-09-21",
            "meta": {"isbn": "978-0261102217"}
        })
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(filter("").matches(&book()));
    }

    #[test]
    fn keyless_terms_search_every_field() {
        assert!(filter("hobbit").matches(&book()));
        assert!(filter("fantasy").matches(&book()));
        assert!(!filter("dragon").matches(&book()));
    }

    #[test]
    fn keyed_substring_is_case_insensitive() {
        assert!(filter("author:tolkien").matches(&book()));
        assert!(filter("title:\"the hobbit\"").matches(&book()));
        assert!(!filter("title:tolkien").matches(&book()));
    }

    #[test]
    fn case_sensitive_option() {
        let options = FilterOptions {
            case_sensitive: true,
        };
        let strict = RecordFilter::new(&parse("author:tolkien"), options).unwrap();
        assert!(!strict.matches(&book()));
        let exact = RecordFilter::new(&parse("author:Tolkien"), options).unwrap();
        assert!(exact.matches(&book()));
    }

    #[test]
    fn negation_and_missing_fields() {
        assert!(!filter("-title:hobbit").matches(&book()));
        assert!(!filter("publisher:allen").matches(&book()));
        assert!(filter("-publisher:allen").matches(&book()));
    }

    #[test]
    fn numeric_comparisons() {
        assert!(filter("price>10").matches(&book()));
        assert!(filter("price:10..20").matches(&book()));
        assert!(!filter("price<=12").matches(&book()));
        assert!(filter("price=12.5").matches(&book()));
    }

    #[test]
    fn date_comparisons() {
        assert!(filter("created:1937").matches(&book()));
        assert!(filter("created:1937-09").matches(&book()));
        assert!(!filter("created>1937").matches(&book()));
        assert!(filter("created<1938-01-01").matches(&book()));
        assert!(!filter("-created:1937").matches(&book()));
    }

    #[test]
    fn regex_conditions() {
        assert!(filter("title:/^the h/").matches(&book()));
        assert!(filter("/classic$/").matches(&book()));
        assert!(!filter("title:/^hobbit/").matches(&book()));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = RecordFilter::new(&parse("title:/(/"), FilterOptions::default()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { position: 0, .. }));
    }

    #[test]
    fn dotted_keys_reach_nested_fields() {
        assert!(filter("meta.isbn:978-026").matches(&book()));
    }

    #[test]
    fn boolean_structure() {
        assert!(filter("dragon OR hobbit").matches(&book()));
        assert!(!filter("dragon hobbit").matches(&book()));
        assert!(filter("-(dragon OR wizard) hobbit").matches(&book()));
    }

    #[test]
    fn sort_markers_do_not_filter() {
        assert!(filter("hobbit desc:price").matches(&book()));
        assert!(filter("-asc:title").matches(&book()));
    }

    #[test]
    fn sort_markers_are_neutral_inside_or() {
        let cheap = json!({"title": "The Hobbit", "price": 3});
        assert!(!filter("dragon OR desc:price").matches(&cheap));
        assert!(filter("hobbit OR desc:price").matches(&cheap));
        assert!(!filter("-(hobbit OR asc:title)").matches(&cheap));
        assert!(filter("-(dragon OR asc:title)").matches(&cheap));
        assert!(filter("(asc:title OR desc:price)").matches(&cheap));
    }

    #[test]
    fn apply_filters_then_sorts() {
        let records = vec![
            json!({"name": "a", "kind": "book", "price": 5}),
            json!({"name": "b", "kind": "film", "price": 50}),
            json!({"name": "c", "kind": "book", "price": 20}),
        ];
        let kept = filter("kind:book desc:price").apply(records);
        let names: Vec<&str> = kept.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn apply_json_requires_an_array() {
        let err = filter("x").apply_json(json!({"x": 1})).unwrap_err();
        assert!(matches!(err, FilterError::NotAnArray { found: "object" }));
    }
}
