//! Leg definitions: a right, a signed unit quantity, and the predicates a
//! candidate position must satisfy.

use crate::collection::OptionPositionCollection;
use crate::enumerator::EnumeratorPolicy;
use crate::matching::predicate::LegPredicate;
use crate::position::OptionPosition;
use crate::symbol::OptionRight;

/// A candidate pairing of a leg requirement with a concrete position.
///
/// The carried position holds `multiplier x unit quantity` contracts: the
/// largest whole number of copies of the leg the holding supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyLegMatch {
    multiplier: i64,
    position: OptionPosition,
}

impl StrategyLegMatch {
    /// Create a leg match. `position.quantity()` must equal
    /// `multiplier x` the leg's unit quantity, with `multiplier >= 1`.
    #[must_use]
    pub const fn new(multiplier: i64, position: OptionPosition) -> Self {
        Self {
            multiplier,
            position,
        }
    }

    /// How many copies of the leg the holding supports.
    #[must_use]
    pub const fn multiplier(&self) -> i64 {
        self.multiplier
    }

    /// The matched sub-position.
    #[must_use]
    pub const fn position(&self) -> &OptionPosition {
        &self.position
    }

    /// Signed contracts per single copy of the leg.
    #[must_use]
    pub const fn unit_quantity(&self) -> i64 {
        self.position.quantity() / self.multiplier
    }

    /// The sub-position consumed by `multiplier` copies of the leg.
    #[must_use]
    pub fn scaled(&self, multiplier: i64) -> OptionPosition {
        self.position.with_quantity(self.unit_quantity() * multiplier)
    }
}

/// One leg requirement of a strategy definition.
///
/// `quantity` is the signed unit: `+n` requires a long holding, `-n` a short
/// one. Predicates run in stored order; indexed predicates are moved ahead
/// of raw scans at construction so the collection shrinks through cheap
/// slices first. The reordering does not change which candidates survive.
#[derive(Debug, Clone)]
pub struct LegDefinition {
    right: OptionRight,
    quantity: i64,
    predicates: Vec<LegPredicate>,
}

impl LegDefinition {
    /// Create a leg definition.
    #[must_use]
    pub fn new(right: OptionRight, quantity: i64, predicates: Vec<LegPredicate>) -> Self {
        let (indexed, scans): (Vec<_>, Vec<_>) =
            predicates.into_iter().partition(LegPredicate::is_indexed);
        let mut predicates = indexed;
        predicates.extend(scans);
        Self {
            right,
            quantity,
            predicates,
        }
    }

    /// A call leg.
    #[must_use]
    pub fn call(quantity: i64, predicates: Vec<LegPredicate>) -> Self {
        Self::new(OptionRight::Call, quantity, predicates)
    }

    /// A put leg.
    #[must_use]
    pub fn put(quantity: i64, predicates: Vec<LegPredicate>) -> Self {
        Self::new(OptionRight::Put, quantity, predicates)
    }

    /// Contract right this leg requires.
    #[must_use]
    pub const fn right(&self) -> OptionRight {
        self.right
    }

    /// Signed unit quantity.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The predicates, indexed ones first.
    #[must_use]
    pub fn predicates(&self) -> &[LegPredicate] {
        &self.predicates
    }

    /// Narrow a collection to the candidates satisfying the right and every
    /// predicate, given the legs matched so far.
    #[must_use]
    pub fn filter(
        &self,
        legs: &[OptionPosition],
        positions: &OptionPositionCollection,
        include_underlying: bool,
    ) -> OptionPositionCollection {
        let mut filtered = positions.slice_right(self.right, include_underlying);
        for predicate in &self.predicates {
            if filtered.is_empty() {
                break;
            }
            filtered = predicate.filter(legs, &filtered, include_underlying);
        }
        filtered
    }

    /// Enumerate every candidate match for this leg, in the order the
    /// policy dictates.
    #[must_use]
    pub fn matches(
        &self,
        legs: &[OptionPosition],
        positions: &OptionPositionCollection,
        enumerator: EnumeratorPolicy,
    ) -> Vec<StrategyLegMatch> {
        let filtered = self.filter(legs, positions, false);
        enumerator
            .enumerate(&filtered)
            .into_iter()
            .filter_map(|position| self.match_position(position))
            .collect()
    }

    /// Match a single pre-aligned position against this leg, checking right
    /// and sign but no predicates. Used by callers whose legs are already
    /// lined up with the definition.
    #[must_use]
    pub fn try_match(&self, position: &OptionPosition) -> Option<StrategyLegMatch> {
        if position.right() != Some(self.right) {
            return None;
        }
        self.match_position(position.clone())
    }

    fn match_position(&self, position: OptionPosition) -> Option<StrategyLegMatch> {
        let held = position.quantity();
        if self.quantity == 0 || held.signum() != self.quantity.signum() {
            return None;
        }
        let multiplier = held / self.quantity;
        if multiplier < 1 {
            return None;
        }
        Some(StrategyLegMatch::new(
            multiplier,
            position.with_quantity(multiplier * self.quantity),
        ))
    }
}
