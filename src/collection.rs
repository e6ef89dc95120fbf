//! Persistent indexed collection of option positions on one underlying.

use std::ops::Sub;

use chrono::NaiveDate;
use im::{OrdMap, OrdSet};
use rust_decimal::Decimal;

use crate::comparison::BinaryComparison;
use crate::matching::definition::{OptionStrategyDefinitionMatch, SHARES_PER_LOT};
use crate::position::OptionPosition;
use crate::symbol::{OptionRight, Symbol};

/// An immutable multiset of positions scoped to a single underlying equity,
/// with inverted indexes by right, strike, and expiration over the option
/// contracts.
///
/// The underlying share position lives in the position map but in none of
/// the indexes. Every "modifying" operation returns a new collection; the
/// backing maps share structure, so add/remove cost O(log n) and slices cost
/// proportional to their result size.
///
/// Holdings on any other underlying are skipped silently, both by
/// [`create`](Self::create) and by [`add`](Self::add).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPositionCollection {
    underlying: Symbol,
    positions: OrdMap<Symbol, OptionPosition>,
    puts: OrdSet<Symbol>,
    calls: OrdSet<Symbol>,
    by_strike: OrdMap<Decimal, OrdSet<Symbol>>,
    by_expiration: OrdMap<NaiveDate, OrdSet<Symbol>>,
}

impl OptionPositionCollection {
    /// Create an empty collection scoped to the given underlying.
    #[must_use]
    pub fn empty(underlying: Symbol) -> Self {
        Self {
            underlying,
            positions: OrdMap::new(),
            puts: OrdSet::new(),
            calls: OrdSet::new(),
            by_strike: OrdMap::new(),
            by_expiration: OrdMap::new(),
        }
    }

    /// Build a collection from holdings.
    ///
    /// A holding is included when its symbol is the underlying itself or an
    /// option written on it; anything else is skipped.
    #[must_use]
    pub fn create(
        underlying: Symbol,
        holdings: impl IntoIterator<Item = OptionPosition>,
    ) -> Self {
        Self::empty(underlying).add_range(holdings)
    }

    /// Get the underlying equity symbol.
    #[must_use]
    pub const fn underlying(&self) -> &Symbol {
        &self.underlying
    }

    /// Merge a position into the collection, returning the new collection.
    ///
    /// Quantities on an existing symbol add up; a merge down to zero removes
    /// the symbol from the position map and every index.
    #[must_use]
    pub fn add(&self, position: &OptionPosition) -> Self {
        let symbol = position.symbol();
        if *symbol == self.underlying {
            return self.merge(position, None);
        }
        let (Some(right), Some(strike), Some(expiration)) =
            (symbol.right(), symbol.strike(), symbol.expiration())
        else {
            return self.clone();
        };
        if symbol.underlying() != Some(&self.underlying) {
            return self.clone();
        }
        self.merge(position, Some((right, strike, expiration)))
    }

    /// Merge a batch of positions in one pass.
    #[must_use]
    pub fn add_range(&self, positions: impl IntoIterator<Item = OptionPosition>) -> Self {
        let mut merged = self.clone();
        for position in positions {
            merged = merged.add(&position);
        }
        merged
    }

    /// Subtract a position's quantity, returning the new collection.
    ///
    /// Subtracting down to zero removes the symbol everywhere; subtracting
    /// past zero flips the position's sign.
    #[must_use]
    pub fn remove(&self, position: &OptionPosition) -> Self {
        self.add(&(-position.clone()))
    }

    /// Remove every leg of an accepted strategy match, each scaled by the
    /// overall strategy multiplier, along with any required underlying lots.
    #[must_use]
    pub fn accept(&self, strategy_match: &OptionStrategyDefinitionMatch) -> Self {
        let multiplier = strategy_match.multiplier();
        let mut remaining = self.clone();
        for leg in strategy_match.legs() {
            remaining = remaining.remove(&leg.scaled(multiplier));
        }
        let lots = strategy_match.definition().underlying_lots();
        if lots != 0 {
            let shares = lots * SHARES_PER_LOT * multiplier;
            remaining = remaining.remove(&OptionPosition::new(self.underlying.clone(), shares));
        }
        remaining
    }

    /// Keep only the options with the given right.
    #[must_use]
    pub fn slice_right(&self, right: OptionRight, include_underlying: bool) -> Self {
        let survivors = match right {
            OptionRight::Put => self.puts.clone(),
            OptionRight::Call => self.calls.clone(),
        };
        self.rebuild(&survivors, include_underlying)
    }

    /// Keep only the options whose strike satisfies the comparison against
    /// the reference strike.
    #[must_use]
    pub fn slice_strike(
        &self,
        comparison: BinaryComparison,
        strike: Decimal,
        include_underlying: bool,
    ) -> Self {
        let sliced = comparison.filter_sorted(&self.by_strike, &strike);
        let survivors: OrdSet<Symbol> = sliced.values().flatten().cloned().collect();
        self.rebuild(&survivors, include_underlying)
    }

    /// Keep only the options whose expiration satisfies the comparison
    /// against the reference date.
    #[must_use]
    pub fn slice_expiration(
        &self,
        comparison: BinaryComparison,
        expiration: NaiveDate,
        include_underlying: bool,
    ) -> Self {
        let sliced = comparison.filter_sorted(&self.by_expiration, &expiration);
        let survivors: OrdSet<Symbol> = sliced.values().flatten().cloned().collect();
        self.rebuild(&survivors, include_underlying)
    }

    /// Keep only the options passing the predicate.
    #[must_use]
    pub fn filtered(
        &self,
        keep: impl Fn(&OptionPosition) -> bool,
        include_underlying: bool,
    ) -> Self {
        let survivors: OrdSet<Symbol> = self
            .positions
            .iter()
            .filter(|(symbol, position)| **symbol != self.underlying && keep(position))
            .map(|(symbol, _)| symbol.clone())
            .collect();
        self.rebuild(&survivors, include_underlying)
    }

    /// Check whether the collection holds a position on the symbol.
    #[must_use]
    pub fn has_position(&self, symbol: &Symbol) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Get the position on the symbol, if any.
    #[must_use]
    pub fn try_get(&self, symbol: &Symbol) -> Option<&OptionPosition> {
        self.positions.get(symbol)
    }

    /// Check whether the collection holds no positions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of positions, the underlying included when held.
    #[must_use]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// Number of option positions, the underlying excluded.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.count() - usize::from(self.holds_underlying())
    }

    /// Check whether the underlying shares are held.
    #[must_use]
    pub fn holds_underlying(&self) -> bool {
        self.positions.contains_key(&self.underlying)
    }

    /// Signed quantity of underlying shares held, zero when absent.
    #[must_use]
    pub fn underlying_quantity(&self) -> i64 {
        self.positions
            .get(&self.underlying)
            .map_or(0, OptionPosition::quantity)
    }

    /// Number of distinct put contracts.
    #[must_use]
    pub fn unique_puts(&self) -> usize {
        self.puts.len()
    }

    /// Number of distinct call contracts.
    #[must_use]
    pub fn unique_calls(&self) -> usize {
        self.calls.len()
    }

    /// Number of distinct strikes across the option contracts.
    #[must_use]
    pub fn unique_strikes(&self) -> usize {
        self.by_strike.len()
    }

    /// Number of distinct expirations across the option contracts.
    #[must_use]
    pub fn unique_expirations(&self) -> usize {
        self.by_expiration.len()
    }

    /// Iterate all positions in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionPosition> {
        self.positions.values()
    }

    fn merge(
        &self,
        position: &OptionPosition,
        index_key: Option<(OptionRight, Decimal, NaiveDate)>,
    ) -> Self {
        let symbol = position.symbol();
        let existing = self.positions.get(symbol);
        let merged_quantity = existing.map_or(0, OptionPosition::quantity) + position.quantity();

        if merged_quantity == 0 {
            if existing.is_none() {
                return self.clone();
            }
            let positions = self.positions.without(symbol);
            let Some((right, strike, expiration)) = index_key else {
                return Self {
                    underlying: self.underlying.clone(),
                    positions,
                    puts: self.puts.clone(),
                    calls: self.calls.clone(),
                    by_strike: self.by_strike.clone(),
                    by_expiration: self.by_expiration.clone(),
                };
            };
            let (puts, calls) = match right {
                OptionRight::Put => (self.puts.without(symbol), self.calls.clone()),
                OptionRight::Call => (self.puts.clone(), self.calls.without(symbol)),
            };
            return Self {
                underlying: self.underlying.clone(),
                positions,
                puts,
                calls,
                by_strike: bucket_remove(&self.by_strike, &strike, symbol),
                by_expiration: bucket_remove(&self.by_expiration, &expiration, symbol),
            };
        }

        let already_indexed = existing.is_some();
        let positions = self
            .positions
            .update(symbol.clone(), position.with_quantity(merged_quantity));
        let Some((right, strike, expiration)) = index_key.filter(|_| !already_indexed) else {
            return Self {
                underlying: self.underlying.clone(),
                positions,
                puts: self.puts.clone(),
                calls: self.calls.clone(),
                by_strike: self.by_strike.clone(),
                by_expiration: self.by_expiration.clone(),
            };
        };

        let (puts, calls) = match right {
            OptionRight::Put => (self.puts.update(symbol.clone()), self.calls.clone()),
            OptionRight::Call => (self.puts.clone(), self.calls.update(symbol.clone())),
        };
        Self {
            underlying: self.underlying.clone(),
            positions,
            puts,
            calls,
            by_strike: bucket_insert(&self.by_strike, strike, symbol),
            by_expiration: bucket_insert(&self.by_expiration, expiration, symbol),
        }
    }

    /// Rebuild a collection holding only the surviving option symbols,
    /// recomputing every index from them.
    fn rebuild(&self, survivors: &OrdSet<Symbol>, include_underlying: bool) -> Self {
        let mut sliced = Self::empty(self.underlying.clone());
        for symbol in survivors {
            if let Some(position) = self.positions.get(symbol) {
                sliced = sliced.add(position);
            }
        }
        if include_underlying {
            if let Some(shares) = self.positions.get(&self.underlying) {
                sliced = sliced.add(shares);
            }
        }
        sliced
    }
}

impl Sub<&OptionPosition> for &OptionPositionCollection {
    type Output = OptionPositionCollection;

    fn sub(self, rhs: &OptionPosition) -> OptionPositionCollection {
        self.remove(rhs)
    }
}

fn bucket_insert<K: Ord + Clone>(
    map: &OrdMap<K, OrdSet<Symbol>>,
    key: K,
    symbol: &Symbol,
) -> OrdMap<K, OrdSet<Symbol>> {
    let bucket = map
        .get(&key)
        .cloned()
        .unwrap_or_default()
        .update(symbol.clone());
    map.update(key, bucket)
}

fn bucket_remove<K: Ord + Clone>(
    map: &OrdMap<K, OrdSet<Symbol>>,
    key: &K,
    symbol: &Symbol,
) -> OrdMap<K, OrdSet<Symbol>> {
    match map.get(key) {
        None => map.clone(),
        Some(bucket) => {
            let bucket = bucket.without(symbol);
            if bucket.is_empty() {
                map.without(key)
            } else {
                map.update(key.clone(), bucket)
            }
        }
    }
}
