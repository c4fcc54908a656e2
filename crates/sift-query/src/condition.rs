//! Condition extraction: the flat view of a query tree.

use serde::Serialize;

use crate::{
    ast::{AstNode, ConditionNode, ConditionValue, TermKind},
    lexer::Comparison,
};

/// A leaf condition with negation propagated from every enclosing group.
///
/// This is the stable view handed to evaluators and query adapters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstCondition {
    /// Field the condition applies to; `None` means any field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value to test.
    pub value: ConditionValue,
    /// Character offset of the term.
    pub position: usize,
    /// The leaf or any enclosing group is negated.
    pub is_negated: bool,
    /// The value is a regular expression.
    pub is_regex: bool,
    /// The value is a number.
    pub is_numeric: bool,
    /// The value is an instant.
    pub is_date: bool,
    /// Comparison for numeric and date conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Comparison>,
    /// How the term was written.
    pub token_kind: TermKind,
}

impl AstCondition {
    /// Builds the flat view of `leaf` under an already composed negation flag.
    pub fn from_node(leaf: &ConditionNode, is_negated: bool) -> Self {
        Self {
            key: leaf.key.clone(),
            value: leaf.value.clone(),
            position: leaf.position,
            is_negated,
            is_regex: leaf.token_kind.is_regex(),
            is_numeric: leaf.token_kind.is_numeric(),
            is_date: leaf.token_kind.is_date(),
            operator: leaf.operator,
            token_kind: leaf.token_kind,
        }
    }
}

/// Flattens a tree into its leaf conditions, left to right.
///
/// Leaves whose value is empty text are left out, and so are numeric zeros
/// when `drop_zero` is set.
pub fn extract(ast: Option<&AstNode>, drop_zero: bool) -> Vec<AstCondition> {
    let mut conditions = Vec::new();
    let mut stack: Vec<(&AstNode, bool)> = ast.map(|root| (root, false)).into_iter().collect();

    while let Some((node, parent_negated)) = stack.pop() {
        let is_negated = parent_negated || node.negated();
        match node {
            AstNode::Binary(binary) => {
                stack.push((&binary.right, is_negated));
                stack.push((&binary.left, is_negated));
            }
            AstNode::Condition(leaf) => {
                let skip = if drop_zero {
                    leaf.value.is_falsy()
                } else {
                    leaf.value.is_empty()
                };
                if !skip {
                    conditions.push(AstCondition::from_node(leaf, is_negated));
                }
            }
        }
    }

    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ParserConfig, lexer::tokenize, parser::build};

    fn conditions(input: &str) -> Vec<AstCondition> {
        let tree = build(&tokenize(input, &ParserConfig::default()).tokens);
        extract(tree.as_ref(), false)
    }

    #[test]
    fn empty_tree() {
        assert!(extract(None, false).is_empty());
    }

    #[test]
    fn source_order() {
        let found = conditions("a (b OR c) d");
        let values: Vec<String> = found.iter().map(|c| c.value.to_string()).collect();
        assert_eq!(values, vec!["a", "b", "c", "d"]);
        let positions: Vec<usize> = found.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 3, 8, 11]);
    }

    #[test]
    fn group_negation_propagates() {
        let found = conditions("-(a b) c");
        let negated: Vec<bool> = found.iter().map(|c| c.is_negated).collect();
        assert_eq!(negated, vec![true, true, false]);
    }

    #[test]
    fn flags_follow_kind() {
        let found = conditions("/x+/ price>3 at:2024-01-01T10:00");
        assert!(found[0].is_regex && !found[0].is_numeric);
        assert!(found[1].is_numeric);
        assert_eq!(found[1].operator, Some(Comparison::Gt));
        assert!(found[2].is_date);
        assert_eq!(found[2].operator, Some(Comparison::Colon));
    }

    #[test]
    fn empty_phrase_is_excluded() {
        let found = conditions("\"\" title:\"\" a");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, ConditionValue::Text("a".into()));
    }

    #[test]
    fn zero_is_kept() {
        let found = conditions("price:0");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, ConditionValue::Number(0.0));
    }

    #[test]
    fn zero_is_dropped_on_request() {
        let stream = tokenize("price:0 stock>0 price:10 \"\"", &ParserConfig::default());
        let tree = build(&stream.tokens);
        let found = extract(tree.as_ref(), true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, ConditionValue::Number(10.0));
    }
}
