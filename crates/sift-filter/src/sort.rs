//! Sort markers: `asc:field` and `desc:field`.

use std::{cmp::Ordering, fmt};

use serde_json::Value;
use sift_query::AstCondition;

use crate::value::{as_number, as_text, lookup};

/// Reserved key that sorts ascending by the named field.
pub const ASC: &str = "asc";
/// Reserved key that sorts descending by the named field.
pub const DESC: &str = "desc";

/// Returns true if `key` is a sort marker rather than a field.
pub fn is_sort_marker(key: Option<&str>) -> bool {
    matches!(key, Some(ASC | DESC))
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// One level of a multi-key sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to sort by.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Reads a sort marker condition. Other conditions yield `None`.
    pub fn from_condition(condition: &AstCondition) -> Option<Self> {
        let direction = match condition.key.as_deref()? {
            ASC => SortDirection::Asc,
            DESC => SortDirection::Desc,
            _ => return None,
        };
        let field = condition.value.as_text()?;
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Compares two records by this key. Records missing the field sort last.
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let left = lookup(a, &self.field).filter(|v| !v.is_null());
        let right = lookup(b, &self.field).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => {
                let ordering = compare_values(left, right);
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.direction {
            SortDirection::Asc => ASC,
            SortDirection::Desc => DESC,
        };
        write!(f, "{marker}:{}", self.field)
    }
}

/// Orders two present values: numerically when both are numbers, otherwise by text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.total_cmp(&y);
    }
    let x = as_text(a).unwrap_or_else(|| a.to_string());
    let y = as_text(b).unwrap_or_else(|| b.to_string());
    x.cmp(&y)
}

/// Collects sort keys from `asc:`/`desc:` markers, in source order.
pub fn sort_keys(conditions: &[AstCondition]) -> Vec<SortKey> {
    conditions
        .iter()
        .filter_map(SortKey::from_condition)
        .collect()
}

/// Sorts records by `keys`, earlier keys first. The sort is stable.
pub fn sort_records(records: &mut [Value], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sift_query::parse;

    use super::*;

    fn names(records: &[Value]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r["name"].as_str().unwrap_or("?"))
            .collect()
    }

    #[test]
    fn keys_in_source_order() {
        let result = parse("desc:price x asc:name");
        let keys = sort_keys(&result.ast_conditions);
        assert_eq!(
            keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["desc:price", "asc:name"]
        );
    }

    #[test]
    fn multi_key_sort() {
        let mut records = vec![
            json!({"name": "b", "price": 10}),
            json!({"name": "a", "price": 10}),
            json!({"name": "c", "price": 30}),
            json!({"name": "d"}),
        ];
        let keys = sort_keys(&parse("desc:price asc:name").ast_conditions);
        sort_records(&mut records, &keys);
        assert_eq!(names(&records), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn numbers_sort_numerically() {
        let mut records = vec![
            json!({"name": "ten", "n": "10"}),
            json!({"name": "nine", "n": 9}),
        ];
        sort_records(
            &mut records,
            &[SortKey {
                field: "n".into(),
                direction: SortDirection::Asc,
            }],
        );
        assert_eq!(names(&records), vec!["nine", "ten"]);
    }

    #[test]
    fn markers_are_recognized() {
        assert!(is_sort_marker(Some("asc")));
        assert!(!is_sort_marker(Some("title")));
        assert!(!is_sort_marker(None));
    }
}
