//! Strategy definitions and the recursive leg-assignment search.

use std::time::Instant;

use rust_decimal::Decimal;

use crate::collection::OptionPositionCollection;
use crate::enumerator::EnumeratorPolicy;
use crate::error::DefinitionError;
use crate::matching::leg::{LegDefinition, StrategyLegMatch};
use crate::position::OptionPosition;
use crate::strategy::{OptionLeg, OrderType, Strategy, UnderlyingLeg};

/// Shares represented by one underlying lot.
pub const SHARES_PER_LOT: i64 = 100;

/// Limits and policy for one enumeration pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MatchContext<'a> {
    pub deadline: Option<Instant>,
    pub leg_caps: &'a [usize],
    pub enumerator: EnumeratorPolicy,
}

impl MatchContext<'_> {
    pub(crate) fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn leg_cap(&self, leg: usize) -> usize {
        self.leg_caps.get(leg).copied().unwrap_or(usize::MAX)
    }
}

/// A named strategy shape: an ordered list of leg requirements plus an
/// optional underlying share requirement in lots of [`SHARES_PER_LOT`].
///
/// Built through [`builder`](Self::builder), which rejects definitions with
/// no legs and predicates referencing legs that are matched later.
#[derive(Debug, Clone)]
pub struct OptionStrategyDefinition {
    name: String,
    underlying_lots: i64,
    legs: Vec<LegDefinition>,
}

impl OptionStrategyDefinition {
    /// Start building a definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> StrategyDefinitionBuilder {
        StrategyDefinitionBuilder {
            name: name.into(),
            underlying_lots: 0,
            legs: Vec::new(),
        }
    }

    /// Definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required underlying lots per copy of the strategy.
    #[must_use]
    pub const fn underlying_lots(&self) -> i64 {
        self.underlying_lots
    }

    /// The leg requirements in match order.
    #[must_use]
    pub fn legs(&self) -> &[LegDefinition] {
        &self.legs
    }

    /// Enumerate every way the collection satisfies this definition.
    ///
    /// Matches come out in depth-first order: the order candidates are
    /// enumerated within each leg, legs in definition order. Equal inputs
    /// always produce the same sequence.
    #[must_use]
    pub fn matches(
        &self,
        positions: &OptionPositionCollection,
    ) -> Vec<OptionStrategyDefinitionMatch> {
        let mut found = Vec::new();
        self.enumerate_matches(positions, MatchContext::default(), &mut |strategy_match| {
            found.push(strategy_match);
            true
        });
        found
    }

    /// Depth-first enumeration feeding each complete match to the visitor.
    /// The visitor returns `false` to stop the search; the expansion also
    /// stops when the context deadline passes. Returns `false` when the
    /// search was cut short.
    pub(crate) fn enumerate_matches(
        &self,
        positions: &OptionPositionCollection,
        context: MatchContext<'_>,
        visit: &mut dyn FnMut(OptionStrategyDefinitionMatch) -> bool,
    ) -> bool {
        let mut leg_matches = Vec::with_capacity(self.legs.len());
        let mut leg_positions = Vec::with_capacity(self.legs.len());
        self.expand(
            positions,
            context,
            &mut leg_matches,
            &mut leg_positions,
            visit,
        )
    }

    fn expand(
        &self,
        remaining: &OptionPositionCollection,
        context: MatchContext<'_>,
        leg_matches: &mut Vec<StrategyLegMatch>,
        leg_positions: &mut Vec<OptionPosition>,
        visit: &mut dyn FnMut(OptionStrategyDefinitionMatch) -> bool,
    ) -> bool {
        if context.expired() {
            tracing::trace!(strategy = %self.name, "leg expansion stopped at deadline");
            return false;
        }
        let leg = leg_matches.len();
        if leg == self.legs.len() {
            let Some(multiplier) = self.strategy_multiplier(leg_matches, remaining) else {
                return true;
            };
            return visit(OptionStrategyDefinitionMatch::new(
                self.clone(),
                leg_matches.clone(),
                multiplier,
            ));
        }
        if remaining.is_empty() {
            return true;
        }
        let candidates = self.legs[leg].matches(leg_positions, remaining, context.enumerator);
        for candidate in candidates.into_iter().take(context.leg_cap(leg)) {
            let narrowed = remaining.remove(candidate.position());
            leg_positions.push(candidate.position().clone());
            leg_matches.push(candidate);
            let searching = self.expand(&narrowed, context, leg_matches, leg_positions, visit);
            leg_matches.pop();
            leg_positions.pop();
            if !searching {
                return false;
            }
        }
        true
    }

    /// Overall multiplier: the smallest per-leg multiplier, additionally
    /// capped by available underlying shares when the definition requires
    /// them. `None` when no whole copy fits.
    fn strategy_multiplier(
        &self,
        legs: &[StrategyLegMatch],
        remaining: &OptionPositionCollection,
    ) -> Option<i64> {
        let mut multiplier = legs.iter().map(StrategyLegMatch::multiplier).min()?;
        if self.underlying_lots != 0 {
            let required = self.underlying_lots * SHARES_PER_LOT;
            let available = remaining.underlying_quantity();
            if available.signum() != required.signum() {
                return None;
            }
            multiplier = multiplier.min(available / required);
        }
        (multiplier >= 1).then_some(multiplier)
    }

    /// Match a pre-aligned list of positions, one per leg, without
    /// searching. Every leg is verified independently for right, sign, and
    /// unit multiplier; the overall multiplier is the minimum across legs
    /// and every output leg is scaled to it.
    #[must_use]
    pub fn try_match(
        &self,
        positions: &[OptionPosition],
    ) -> Option<OptionStrategyDefinitionMatch> {
        if positions.len() != self.legs.len() {
            return None;
        }
        let mut legs = Vec::with_capacity(self.legs.len());
        for (leg, position) in self.legs.iter().zip(positions) {
            legs.push(leg.try_match(position)?);
        }
        let multiplier = legs.iter().map(StrategyLegMatch::multiplier).min()?;
        let scaled = legs
            .iter()
            .map(|leg| StrategyLegMatch::new(multiplier, leg.scaled(multiplier)))
            .collect();
        Some(OptionStrategyDefinitionMatch::new(
            self.clone(),
            scaled,
            multiplier,
        ))
    }
}

/// Builder for [`OptionStrategyDefinition`].
#[derive(Debug)]
pub struct StrategyDefinitionBuilder {
    name: String,
    underlying_lots: i64,
    legs: Vec<LegDefinition>,
}

impl StrategyDefinitionBuilder {
    /// Require underlying shares, in lots of [`SHARES_PER_LOT`], per copy.
    #[must_use]
    pub const fn underlying_lots(mut self, lots: i64) -> Self {
        self.underlying_lots = lots;
        self
    }

    /// Append a leg requirement.
    #[must_use]
    pub fn leg(mut self, leg: LegDefinition) -> Self {
        self.legs.push(leg);
        self
    }

    /// Finish the definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the definition has no legs, or when
    /// a leg predicate references a leg at or beyond its own index.
    pub fn build(self) -> Result<OptionStrategyDefinition, DefinitionError> {
        if self.legs.is_empty() {
            return Err(DefinitionError::NoLegs { name: self.name });
        }
        for (index, leg) in self.legs.iter().enumerate() {
            for predicate in leg.predicates() {
                if let Some(referenced) = predicate.referenced_leg() {
                    if referenced >= index {
                        return Err(DefinitionError::ForwardLegReference {
                            name: self.name,
                            leg: index,
                            referenced,
                        });
                    }
                }
            }
        }
        Ok(OptionStrategyDefinition {
            name: self.name,
            underlying_lots: self.underlying_lots,
            legs: self.legs,
        })
    }
}

/// A complete assignment of positions to every leg of a definition.
#[derive(Debug, Clone)]
pub struct OptionStrategyDefinitionMatch {
    definition: OptionStrategyDefinition,
    legs: Vec<StrategyLegMatch>,
    multiplier: i64,
}

impl OptionStrategyDefinitionMatch {
    pub(crate) const fn new(
        definition: OptionStrategyDefinition,
        legs: Vec<StrategyLegMatch>,
        multiplier: i64,
    ) -> Self {
        Self {
            definition,
            legs,
            multiplier,
        }
    }

    /// The matched definition.
    #[must_use]
    pub const fn definition(&self) -> &OptionStrategyDefinition {
        &self.definition
    }

    /// The per-leg matches, in definition leg order.
    #[must_use]
    pub fn legs(&self) -> &[StrategyLegMatch] {
        &self.legs
    }

    /// How many copies of the strategy the assignment supports.
    #[must_use]
    pub const fn multiplier(&self) -> i64 {
        self.multiplier
    }

    /// Materialize the match as an output strategy, every leg scaled to the
    /// overall multiplier.
    #[must_use]
    pub fn create_strategy(&self) -> Strategy {
        let underlying = self
            .legs
            .first()
            .and_then(|leg| leg.position().symbol().underlying())
            .cloned()
            .unwrap_or_default();
        let option_legs = self
            .legs
            .iter()
            .filter_map(|leg| {
                let position = leg.scaled(self.multiplier);
                let symbol = position.symbol().clone();
                let (Some(right), Some(strike), Some(expiration)) =
                    (symbol.right(), symbol.strike(), symbol.expiration())
                else {
                    return None;
                };
                Some(OptionLeg {
                    symbol,
                    right,
                    strike,
                    expiration,
                    quantity: position.quantity(),
                    order_type: OrderType::Market,
                    order_price: Decimal::ZERO,
                })
            })
            .collect();
        let underlying_legs = if self.definition.underlying_lots == 0 {
            Vec::new()
        } else {
            vec![UnderlyingLeg {
                quantity: self.definition.underlying_lots * SHARES_PER_LOT * self.multiplier,
            }]
        };
        Strategy {
            name: self.definition.name.clone(),
            underlying,
            option_legs,
            underlying_legs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::BinaryComparison;
    use crate::matching::predicate::LegPredicate;
    use crate::symbol::Symbol;
    use chrono::NaiveDate;

    fn underlying() -> Symbol {
        Symbol::equity("AAPL")
    }

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()
    }

    fn call(strike: i64, quantity: i64) -> OptionPosition {
        OptionPosition::new(
            Symbol::call(underlying(), Decimal::new(strike, 0), expiry()),
            quantity,
        )
    }

    fn put(strike: i64, quantity: i64) -> OptionPosition {
        OptionPosition::new(
            Symbol::put(underlying(), Decimal::new(strike, 0), expiry()),
            quantity,
        )
    }

    fn vertical_call() -> OptionStrategyDefinition {
        OptionStrategyDefinition::builder("Vertical Call")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThanOrEqual, 0),
                    LegPredicate::expiration_vs_leg(BinaryComparison::Equal, 0),
                ],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_empty_definitions() {
        let err = OptionStrategyDefinition::builder("Empty").build().unwrap_err();
        assert!(matches!(err, DefinitionError::NoLegs { .. }));
    }

    #[test]
    fn builder_rejects_forward_references() {
        let err = OptionStrategyDefinition::builder("Forward")
            .leg(LegDefinition::call(
                1,
                vec![LegPredicate::strike_vs_leg(BinaryComparison::Equal, 1)],
            ))
            .leg(LegDefinition::call(1, Vec::new()))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::ForwardLegReference {
                name: "Forward".to_string(),
                leg: 0,
                referenced: 1,
            }
        );
    }

    #[test]
    fn builder_rejects_self_references() {
        let err = OptionStrategyDefinition::builder("Selfish")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::call(
                1,
                vec![LegPredicate::strike_vs_leg(BinaryComparison::Equal, 1)],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ForwardLegReference { .. }));
    }

    #[test]
    fn matches_enumerate_consistent_assignments() {
        let positions =
            OptionPositionCollection::create(underlying(), vec![call(95, 3), call(100, 5)]);
        let matches = vertical_call().matches(&positions);

        assert_eq!(matches.len(), 1);
        let found = &matches[0];
        assert_eq!(found.multiplier(), 3);
        assert_eq!(found.legs()[0].position().strike(), Some(Decimal::new(95, 0)));
        assert_eq!(found.legs()[1].position().strike(), Some(Decimal::new(100, 0)));
    }

    #[test]
    fn every_yielded_match_satisfies_its_predicates() {
        let positions = OptionPositionCollection::create(
            underlying(),
            vec![call(90, 2), call(95, 3), call(100, 5), call(105, 1)],
        );
        let definition = vertical_call();
        let matches = definition.matches(&positions);
        assert!(!matches.is_empty());

        for found in &matches {
            let mut prior: Vec<OptionPosition> = Vec::new();
            for (leg_definition, leg) in definition.legs().iter().zip(found.legs()) {
                for predicate in leg_definition.predicates() {
                    assert!(predicate.matches(&prior, leg.position()));
                }
                prior.push(leg.position().clone());
            }
        }
    }

    #[test]
    fn matches_are_deterministic() {
        let positions = OptionPositionCollection::create(
            underlying(),
            vec![call(90, 2), call(95, 3), call(100, 5)],
        );
        let first: Vec<_> = vertical_call()
            .matches(&positions)
            .iter()
            .map(|m| m.legs()[0].position().clone())
            .collect();
        let second: Vec<_> = vertical_call()
            .matches(&positions)
            .iter()
            .map(|m| m.legs()[0].position().clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn try_match_multiplier_is_the_leg_minimum() {
        let matched = vertical_call()
            .try_match(&[call(95, 3), call(100, 5)])
            .unwrap();
        assert_eq!(matched.multiplier(), 3);
        // Every output leg is scaled to the overall multiplier.
        assert_eq!(matched.legs()[0].position().quantity(), 3);
        assert_eq!(matched.legs()[1].position().quantity(), 3);
    }

    #[test]
    fn try_match_rejects_length_mismatch() {
        assert!(vertical_call().try_match(&[call(95, 3)]).is_none());
    }

    #[test]
    fn try_match_rejects_failing_legs() {
        // Second leg is a put: wrong right.
        assert!(vertical_call()
            .try_match(&[call(95, 3), put(100, 5)])
            .is_none());
        // Zero multiplier on the first leg.
        let two_lot = OptionStrategyDefinition::builder("Two Lot")
            .leg(LegDefinition::call(2, Vec::new()))
            .leg(LegDefinition::call(1, Vec::new()))
            .build()
            .unwrap();
        assert!(two_lot.try_match(&[call(95, 1), call(100, 1)]).is_none());
    }

    #[test]
    fn underlying_lots_cap_the_multiplier() {
        let covered = OptionStrategyDefinition::builder("Covered")
            .underlying_lots(1)
            .leg(LegDefinition::call(-1, Vec::new()))
            .build()
            .unwrap();

        let positions = OptionPositionCollection::create(
            underlying(),
            vec![call(100, -5), OptionPosition::new(underlying(), 300)],
        );
        let matches = covered.matches(&positions);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].multiplier(), 3);

        let no_shares =
            OptionPositionCollection::create(underlying(), vec![call(100, -5)]);
        assert!(covered.matches(&no_shares).is_empty());
    }

    #[test]
    fn create_strategy_materializes_scaled_legs() {
        let positions =
            OptionPositionCollection::create(underlying(), vec![call(95, 3), call(100, 5)]);
        let matches = vertical_call().matches(&positions);
        let strategy = matches[0].create_strategy();

        assert_eq!(strategy.name, "Vertical Call");
        assert_eq!(strategy.underlying.as_str(), "AAPL");
        assert_eq!(strategy.option_legs.len(), 2);
        assert!(strategy.underlying_legs.is_empty());
        assert_eq!(strategy.option_legs[0].quantity, 3);
        assert_eq!(strategy.option_legs[1].quantity, 3);
        assert_eq!(strategy.option_legs[0].order_type, OrderType::Market);
        assert_eq!(strategy.option_legs[0].order_price, Decimal::ZERO);
    }

    #[test]
    fn create_strategy_includes_underlying_legs() {
        let covered = OptionStrategyDefinition::builder("Covered")
            .underlying_lots(1)
            .leg(LegDefinition::call(-1, Vec::new()))
            .build()
            .unwrap();
        let positions = OptionPositionCollection::create(
            underlying(),
            vec![call(100, -2), OptionPosition::new(underlying(), 1000)],
        );
        let strategy = covered.matches(&positions)[0].create_strategy();
        assert_eq!(strategy.underlying_legs.len(), 1);
        assert_eq!(strategy.underlying_legs[0].quantity, 200);
    }
}
