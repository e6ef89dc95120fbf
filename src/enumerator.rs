//! Candidate ordering policies for the matcher.

use serde::{Deserialize, Serialize};

use crate::collection::OptionPositionCollection;
use crate::position::OptionPosition;
use crate::symbol::OptionRight;

/// Decides the order in which positions are considered while expanding a
/// leg. Enumeration order is deterministic for equal inputs, so the matcher
/// yields the same sequence on every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumeratorPolicy {
    /// Natural collection order (symbol order).
    #[default]
    Default,
    /// The underlying first, then long positions, then short puts by
    /// ascending strike, then short calls by ascending strike.
    AbsoluteRisk,
}

impl EnumeratorPolicy {
    /// Materialize the positions of a collection in this policy's order.
    #[must_use]
    pub fn enumerate(self, positions: &OptionPositionCollection) -> Vec<OptionPosition> {
        match self {
            Self::Default => positions.iter().cloned().collect(),
            Self::AbsoluteRisk => {
                let mut shares = Vec::new();
                let mut longs = Vec::new();
                let mut short_puts = Vec::new();
                let mut short_calls = Vec::new();
                for position in positions.iter() {
                    match (position.right(), position.is_long()) {
                        (None, _) => shares.push(position.clone()),
                        (Some(_), true) => longs.push(position.clone()),
                        (Some(OptionRight::Put), false) => short_puts.push(position.clone()),
                        (Some(OptionRight::Call), false) => short_calls.push(position.clone()),
                    }
                }
                short_puts.sort_by_key(OptionPosition::strike);
                short_calls.sort_by_key(OptionPosition::strike);
                shares
                    .into_iter()
                    .chain(longs)
                    .chain(short_puts)
                    .chain(short_calls)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn collection() -> OptionPositionCollection {
        let underlying = Symbol::equity("AAPL");
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        let contract = |right: OptionRight, strike: i64| match right {
            OptionRight::Call => Symbol::call(underlying.clone(), Decimal::new(strike, 0), expiry),
            OptionRight::Put => Symbol::put(underlying.clone(), Decimal::new(strike, 0), expiry),
        };
        OptionPositionCollection::create(
            underlying.clone(),
            vec![
                OptionPosition::new(contract(OptionRight::Call, 110), -1),
                OptionPosition::new(contract(OptionRight::Call, 105), -2),
                OptionPosition::new(contract(OptionRight::Put, 95), -3),
                OptionPosition::new(contract(OptionRight::Put, 90), -4),
                OptionPosition::new(contract(OptionRight::Call, 100), 5),
                OptionPosition::new(underlying, 1000),
            ],
        )
    }

    #[test]
    fn default_policy_uses_symbol_order() {
        let ordered = EnumeratorPolicy::Default.enumerate(&collection());
        let symbols: Vec<_> = ordered
            .iter()
            .map(|p| p.symbol().as_str().to_string())
            .collect();
        let mut sorted = symbols.clone();
        sorted.sort();
        assert_eq!(symbols, sorted);
    }

    #[test]
    fn absolute_risk_orders_by_exposure() {
        let ordered = EnumeratorPolicy::AbsoluteRisk.enumerate(&collection());
        let quantities: Vec<i64> = ordered.iter().map(OptionPosition::quantity).collect();
        assert_eq!(quantities, vec![1000, 5, -4, -3, -2, -1]);

        // Short puts come before short calls, each in ascending strike.
        let strikes: Vec<_> = ordered.iter().skip(2).map(|p| p.strike()).collect();
        assert_eq!(
            strikes,
            vec![
                Some(Decimal::new(90, 0)),
                Some(Decimal::new(95, 0)),
                Some(Decimal::new(105, 0)),
                Some(Decimal::new(110, 0)),
            ]
        );
    }

    #[test]
    fn policies_enumerate_every_position() {
        let c = collection();
        assert_eq!(EnumeratorPolicy::Default.enumerate(&c).len(), c.count());
        assert_eq!(EnumeratorPolicy::AbsoluteRisk.enumerate(&c).len(), c.count());
    }
}
