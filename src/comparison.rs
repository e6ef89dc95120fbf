//! Reified binary comparisons with index-aware filtering.

use std::fmt;
use std::ops::Bound;

use im::OrdMap;
use serde::{Deserialize, Serialize};

/// The six arithmetic comparisons, reified so leg constraints can be pushed
/// down into sorted indexes instead of scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryComparison {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

impl BinaryComparison {
    /// Evaluate the comparison on two values.
    #[must_use]
    pub fn evaluate<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Equal => left == right,
            Self::NotEqual => left != right,
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
        }
    }

    /// The comparison equivalent to swapping operands.
    ///
    /// `a < b` holds exactly when `b > a`; equality and inequality are
    /// self-dual.
    #[must_use]
    pub const fn flip_operands(self) -> Self {
        match self {
            Self::Equal => Self::Equal,
            Self::NotEqual => Self::NotEqual,
            Self::LessThan => Self::GreaterThan,
            Self::LessThanOrEqual => Self::GreaterThanOrEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanOrEqual => Self::LessThanOrEqual,
        }
    }

    /// Keep the elements satisfying the comparison against `reference`.
    #[must_use]
    pub fn filter_list<T: Ord + Clone>(self, items: &[T], reference: &T) -> Vec<T> {
        items
            .iter()
            .filter(|item| self.evaluate(*item, reference))
            .cloned()
            .collect()
    }

    /// Keep the entries whose key satisfies the comparison against
    /// `reference`, exploiting the map ordering.
    ///
    /// Ordered comparisons take a range view of the tree; equality is a
    /// single lookup and inequality a single removal, so the cost is
    /// O(log n + k) for k surviving entries.
    #[must_use]
    pub fn filter_sorted<K, V>(self, map: &OrdMap<K, V>, reference: &K) -> OrdMap<K, V>
    where
        K: Ord + Clone,
        V: Clone,
    {
        match self {
            Self::Equal => map
                .get(reference)
                .map(|value| OrdMap::unit(reference.clone(), value.clone()))
                .unwrap_or_default(),
            Self::NotEqual => map.without(reference),
            Self::LessThan => collect_range(map.range(..reference)),
            Self::LessThanOrEqual => collect_range(map.range(..=reference)),
            Self::GreaterThan => {
                collect_range(map.range((Bound::Excluded(reference), Bound::Unbounded)))
            }
            Self::GreaterThanOrEqual => collect_range(map.range(reference..)),
        }
    }
}

fn collect_range<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> OrdMap<K, V>
where
    K: Ord + Clone + 'a,
    V: Clone + 'a,
{
    entries.map(|(k, v)| (k.clone(), v.clone())).collect()
}

impl fmt::Display for BinaryComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        };
        write!(f, "{op}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BinaryComparison; 6] = [
        BinaryComparison::Equal,
        BinaryComparison::NotEqual,
        BinaryComparison::LessThan,
        BinaryComparison::LessThanOrEqual,
        BinaryComparison::GreaterThan,
        BinaryComparison::GreaterThanOrEqual,
    ];

    fn sample_map() -> OrdMap<i64, &'static str> {
        [(90, "a"), (95, "b"), (100, "c"), (105, "d")]
            .into_iter()
            .collect()
    }

    #[test]
    fn evaluate_semantics() {
        assert!(BinaryComparison::Equal.evaluate(&1, &1));
        assert!(BinaryComparison::NotEqual.evaluate(&1, &2));
        assert!(BinaryComparison::LessThan.evaluate(&1, &2));
        assert!(BinaryComparison::LessThanOrEqual.evaluate(&2, &2));
        assert!(BinaryComparison::GreaterThan.evaluate(&3, &2));
        assert!(BinaryComparison::GreaterThanOrEqual.evaluate(&2, &2));
        assert!(!BinaryComparison::LessThan.evaluate(&2, &2));
    }

    #[test]
    fn flip_operands_swaps_evaluation() {
        for comparison in ALL {
            for a in 0..3_i64 {
                for b in 0..3_i64 {
                    assert_eq!(
                        comparison.flip_operands().evaluate(&b, &a),
                        comparison.evaluate(&a, &b),
                        "{comparison} on ({a}, {b})"
                    );
                }
            }
        }
    }

    #[test]
    fn flip_operands_is_involutive() {
        for comparison in ALL {
            assert_eq!(comparison.flip_operands().flip_operands(), comparison);
        }
    }

    #[test]
    fn filter_list_keeps_satisfying_elements() {
        let items = [90_i64, 95, 100, 105];
        assert_eq!(
            BinaryComparison::LessThan.filter_list(&items, &100),
            vec![90, 95]
        );
        assert_eq!(
            BinaryComparison::NotEqual.filter_list(&items, &95),
            vec![90, 100, 105]
        );
    }

    #[test]
    fn filter_sorted_prefixes_and_suffixes() {
        let map = sample_map();

        let lt = BinaryComparison::LessThan.filter_sorted(&map, &100);
        assert_eq!(lt.keys().copied().collect::<Vec<_>>(), vec![90, 95]);

        let le = BinaryComparison::LessThanOrEqual.filter_sorted(&map, &100);
        assert_eq!(le.keys().copied().collect::<Vec<_>>(), vec![90, 95, 100]);

        let gt = BinaryComparison::GreaterThan.filter_sorted(&map, &95);
        assert_eq!(gt.keys().copied().collect::<Vec<_>>(), vec![100, 105]);

        let ge = BinaryComparison::GreaterThanOrEqual.filter_sorted(&map, &95);
        assert_eq!(ge.keys().copied().collect::<Vec<_>>(), vec![95, 100, 105]);
    }

    #[test]
    fn filter_sorted_equality_slices() {
        let map = sample_map();

        let eq = BinaryComparison::Equal.filter_sorted(&map, &95);
        assert_eq!(eq.keys().copied().collect::<Vec<_>>(), vec![95]);

        let eq_missing = BinaryComparison::Equal.filter_sorted(&map, &97);
        assert!(eq_missing.is_empty());

        let ne = BinaryComparison::NotEqual.filter_sorted(&map, &95);
        assert_eq!(ne.keys().copied().collect::<Vec<_>>(), vec![90, 100, 105]);
    }

    #[test]
    fn filter_sorted_partitions_at_reference() {
        let map = sample_map();
        let below = BinaryComparison::LessThan.filter_sorted(&map, &100);
        let at_or_above = BinaryComparison::GreaterThanOrEqual.filter_sorted(&map, &100);
        assert_eq!(below.len() + at_or_above.len(), map.len());
    }
}
