//! Ordering of cell values.
//!
//! [`natural_cmp`] is the comparator used whenever a data source does not
//! supply one for the sorted column. [`ordered_cmp`] applies a
//! [`SortOrder`] on top of any comparator.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::CellValue;

/// Type alias for a column comparator.
pub type CompareFn = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

impl SortOrder {
    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Returns `true` for [`SortOrder::Ascending`].
    pub fn is_ascending(self) -> bool {
        matches!(self, SortOrder::Ascending)
    }
}

/// Compares two values of arbitrary kind.
///
/// Rules, in precedence order:
///
/// 1. Two empty values are equal.
/// 2. An empty value sorts before any other value.
/// 3. If one value's type defines a natural ordering against the other's
///    concrete kind, that ordering is used. When both qualify, the value
///    whose type is the more derived match for the other wins; the second
///    value is checked first.
/// 4. Two booleans: `false < true`.
/// 5. Two numbers: compared as `f64`, so `Int(2)` and `Float(2.5)` mix.
/// 6. Anything else: the textual representations are compared.
///
/// The result is consistent for any fixed pair but is not transitive across
/// every mixed-kind triple, since rules 3 and 6 can disagree.
pub fn natural_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if b.is_instance_of(a.kind()) {
        if let Some(ordering) = natural_against(b, a) {
            return ordering.reverse();
        }
    }
    if a.is_instance_of(b.kind()) {
        if let Some(ordering) = natural_against(a, b) {
            return ordering;
        }
    }

    if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
        return x.cmp(&y);
    }

    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    a.to_string().cmp(&b.to_string())
}

/// Natural ordering of `value` against `other`, when `value`'s type has one.
fn natural_against(value: &CellValue, other: &CellValue) -> Option<Ordering> {
    match (value, other) {
        (CellValue::Bool(x), CellValue::Bool(y)) => Some(x.cmp(y)),
        (CellValue::Int(x), CellValue::Int(y)) => Some(x.cmp(y)),
        (CellValue::Float(x), CellValue::Float(y)) => Some(x.total_cmp(y)),
        (CellValue::Text(x), CellValue::Text(y)) => Some(x.cmp(y)),
        (CellValue::Date(x), CellValue::Date(y)) => Some(x.cmp(y)),
        (CellValue::Custom(custom), other) => custom.natural_cmp(other),
        _ => None,
    }
}

/// Applies `order` to the result of `compare`.
///
/// Descending order negates the comparison; equal values stay equal, which
/// keeps a stable sort stable in both directions.
pub fn ordered_cmp<F>(compare: &F, order: SortOrder, a: &CellValue, b: &CellValue) -> Ordering
where
    F: Fn(&CellValue, &CellValue) -> Ordering + ?Sized,
{
    match order {
        SortOrder::Ascending => compare(a, b),
        SortOrder::Descending => compare(a, b).reverse(),
    }
}

/// The default comparator as a shareable [`CompareFn`].
pub fn natural_comparator() -> CompareFn {
    Arc::new(natural_cmp)
}
