//! Folding a parsed query into a backend query.
//!
//! A [`QueryBuilder`] maps single conditions to backend filter fragments and
//! knows how to combine them. [`compile`] walks the query tree, applies the
//! same AND/OR/NOT structure to the fragments, and records which conditions
//! the backend could not express so callers can apply them after fetching.

use sift_query::{AstCondition, AstNode, BoolOp, ParseResult};
use tracing::debug;

use crate::sort::is_sort_marker;

/// Backend-specific construction of filters and orderings.
pub trait QueryBuilder {
    /// A filter expression fragment.
    type Filter;
    /// An ordering expression.
    type Order;

    /// Returns the fragment for the positive form of `condition`, or `None`
    /// to drop it from the filter.
    ///
    /// `condition.is_negated` is informational; negation is applied through
    /// [`QueryBuilder::not`].
    fn condition(&mut self, condition: &AstCondition) -> Option<Self::Filter>;

    /// Returns the ordering for an `asc:`/`desc:` marker, or `None` to drop it.
    fn order(&mut self, _marker: &AstCondition) -> Option<Self::Order> {
        None
    }

    /// Both fragments must hold.
    fn and(&mut self, left: Self::Filter, right: Self::Filter) -> Self::Filter;

    /// Either fragment must hold.
    fn or(&mut self, left: Self::Filter, right: Self::Filter) -> Self::Filter;

    /// The fragment must not hold.
    fn not(&mut self, inner: Self::Filter) -> Self::Filter;
}

/// The output of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery<F, O> {
    /// Combined filter; `None` when no condition produced a fragment.
    pub filter: Option<F>,
    /// Orderings in source order.
    pub order: Vec<O>,
    /// Conditions that produced a filter fragment.
    pub filtered: Vec<AstCondition>,
    /// Sort markers that produced an ordering.
    pub ordered: Vec<AstCondition>,
    /// Conditions the builder declined; apply them after fetching.
    pub dropped: Vec<AstCondition>,
}

impl<F, O> Default for CompiledQuery<F, O> {
    fn default() -> Self {
        Self {
            filter: None,
            order: Vec::new(),
            filtered: Vec::new(),
            ordered: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

/// Walks the tree and feeds it to a builder.
struct Compiler<'a, B: QueryBuilder> {
    /// The backend builder.
    builder: &'a mut B,
    /// Output collected so far.
    output: CompiledQuery<B::Filter, B::Order>,
}

impl<B: QueryBuilder> Compiler<'_, B> {
    /// Folds `node`, whose enclosing groups carry `parent_negated`.
    fn fold(&mut self, node: &AstNode, parent_negated: bool) -> Option<B::Filter> {
        let is_negated = parent_negated || node.negated();
        let fragment = match node {
            AstNode::Binary(binary) => {
                let left = self.fold(&binary.left, is_negated);
                let right = self.fold(&binary.right, is_negated);
                match (left, right) {
                    (Some(l), Some(r)) => Some(match binary.operator {
                        BoolOp::And => self.builder.and(l, r),
                        BoolOp::Or => self.builder.or(l, r),
                    }),
                    (Some(one), None) | (None, Some(one)) => Some(one),
                    (None, None) => None,
                }
            }
            AstNode::Condition(leaf) => {
                if leaf.value.is_empty() {
                    return None;
                }
                let condition = AstCondition::from_node(leaf, is_negated);
                if is_sort_marker(condition.key.as_deref()) {
                    self.route_order(condition);
                    return None;
                }
                match self.builder.condition(&condition) {
                    Some(fragment) => {
                        self.output.filtered.push(condition);
                        Some(fragment)
                    }
                    None => {
                        self.output.dropped.push(condition);
                        None
                    }
                }
            }
        };

        match fragment {
            Some(inner) if node.negated() => Some(self.builder.not(inner)),
            other => other,
        }
    }

    /// Hands a sort marker to the builder.
    fn route_order(&mut self, marker: AstCondition) {
        match self.builder.order(&marker) {
            Some(order) => {
                self.output.order.push(order);
                self.output.ordered.push(marker);
            }
            None => self.output.dropped.push(marker),
        }
    }
}

/// Folds a parse result into a backend filter and ordering.
///
/// A declined condition is left out of the filter: AND or OR with one
/// missing side is the other side, and NOT of a missing side is missing.
pub fn compile<B: QueryBuilder>(
    result: &ParseResult,
    builder: &mut B,
) -> CompiledQuery<B::Filter, B::Order> {
    let mut compiler = Compiler {
        builder,
        output: CompiledQuery::default(),
    };
    if let Some(ast) = &result.ast {
        compiler.output.filter = compiler.fold(ast, false);
    }
    let output = compiler.output;
    debug!(
        filtered = output.filtered.len(),
        ordered = output.ordered.len(),
        dropped = output.dropped.len(),
        "compiled query"
    );
    output
}
