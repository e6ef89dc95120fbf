//! Leg predicates: single comparisons between a candidate position and a
//! fixed value or an attribute of an earlier matched leg.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collection::OptionPositionCollection;
use crate::comparison::BinaryComparison;
use crate::error::PredicateError;
use crate::position::OptionPosition;
use crate::symbol::OptionRight;

/// Attribute of a candidate position a predicate constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateTarget {
    /// Contract right.
    Right,
    /// Strike price.
    Strike,
    /// Expiration date.
    Expiration,
}

impl fmt::Display for PredicateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => write!(f, "right"),
            Self::Strike => write!(f, "strike"),
            Self::Expiration => write!(f, "expiration"),
        }
    }
}

/// A resolved comparand value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A contract right.
    Right(OptionRight),
    /// A strike price.
    Strike(Decimal),
    /// An expiration date.
    Expiration(NaiveDate),
}

impl AttributeValue {
    const fn target(self) -> PredicateTarget {
        match self {
            Self::Right(_) => PredicateTarget::Right,
            Self::Strike(_) => PredicateTarget::Strike,
            Self::Expiration(_) => PredicateTarget::Expiration,
        }
    }

    /// Evaluate a comparison against another value of the same kind.
    /// Values of different kinds never compare true.
    fn compare(self, comparison: BinaryComparison, other: Self) -> bool {
        match (self, other) {
            (Self::Right(a), Self::Right(b)) => comparison.evaluate(&a, &b),
            (Self::Strike(a), Self::Strike(b)) => comparison.evaluate(&a, &b),
            (Self::Expiration(a), Self::Expiration(b)) => comparison.evaluate(&a, &b),
            _ => false,
        }
    }
}

/// The reference side of a predicate: a literal value, or an attribute of an
/// earlier matched leg resolved at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceValue {
    /// A fixed comparand.
    Literal(AttributeValue),
    /// An attribute of an earlier matched leg.
    LegAttribute {
        /// Index into the matched legs.
        leg: usize,
        /// Attribute to read.
        target: PredicateTarget,
    },
}

impl ReferenceValue {
    /// The attribute kind this reference resolves to.
    #[must_use]
    pub const fn target(&self) -> PredicateTarget {
        match self {
            Self::Literal(value) => value.target(),
            Self::LegAttribute { target, .. } => *target,
        }
    }

    /// Index of the leg this reference reads, if any.
    #[must_use]
    pub const fn leg_index(&self) -> Option<usize> {
        match self {
            Self::Literal(_) => None,
            Self::LegAttribute { leg, .. } => Some(*leg),
        }
    }

    /// Resolve against the legs matched so far. Returns `None` when the leg
    /// is not available or lacks the attribute.
    #[must_use]
    pub fn resolve(&self, legs: &[OptionPosition]) -> Option<AttributeValue> {
        match self {
            Self::Literal(value) => Some(*value),
            Self::LegAttribute { leg, target } => {
                let position = legs.get(*leg)?;
                attribute_of(position, *target)
            }
        }
    }
}

fn attribute_of(position: &OptionPosition, target: PredicateTarget) -> Option<AttributeValue> {
    match target {
        PredicateTarget::Right => position.right().map(AttributeValue::Right),
        PredicateTarget::Strike => position.strike().map(AttributeValue::Strike),
        PredicateTarget::Expiration => position.expiration().map(AttributeValue::Expiration),
    }
}

/// One side of an authored comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The candidate position's attribute.
    Candidate(PredicateTarget),
    /// A fixed or earlier-leg comparand.
    Reference(ReferenceValue),
}

/// A raw scan predicate over the matched legs and the candidate.
///
/// Raw predicates cannot be pushed into an index; they run as scans after
/// every indexed predicate. A raw predicate sees only the legs matched
/// before its own leg, so out-of-range lookups simply fail the candidate.
pub type RawPredicateFn = fn(&[OptionPosition], &OptionPosition) -> bool;

#[derive(Debug, Clone, Copy)]
enum PredicateForm {
    Comparison {
        target: PredicateTarget,
        comparison: BinaryComparison,
        reference: ReferenceValue,
    },
    Raw(RawPredicateFn),
}

/// A single constraint on a candidate leg position.
///
/// Predicates are normalized so the candidate attribute is always the left
/// operand; authoring `reference <cmp> candidate` flips the comparison.
#[derive(Debug, Clone, Copy)]
pub struct LegPredicate {
    form: PredicateForm,
}

impl LegPredicate {
    /// Build a predicate from an authored comparison.
    ///
    /// Exactly one operand must reference the candidate position; the other
    /// must be a literal or an earlier-leg attribute of the same kind. When
    /// the candidate is authored on the right, the comparison is flipped so
    /// the stored form reads `candidate <cmp> reference`.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when both operands (or neither) reference
    /// the candidate, or when the operand kinds disagree.
    pub fn new(
        left: Operand,
        comparison: BinaryComparison,
        right: Operand,
    ) -> Result<Self, PredicateError> {
        let (target, comparison, reference) = match (left, right) {
            (Operand::Candidate(target), Operand::Reference(reference)) => {
                (target, comparison, reference)
            }
            (Operand::Reference(reference), Operand::Candidate(target)) => {
                (target, comparison.flip_operands(), reference)
            }
            (Operand::Candidate(_), Operand::Candidate(_)) => {
                return Err(PredicateError::BothSidesCandidate);
            }
            (Operand::Reference(_), Operand::Reference(_)) => {
                return Err(PredicateError::NoCandidateOperand);
            }
        };
        if target != reference.target() {
            return Err(PredicateError::MismatchedTargets {
                candidate: target,
                reference: reference.target(),
            });
        }
        Ok(Self {
            form: PredicateForm::Comparison {
                target,
                comparison,
                reference,
            },
        })
    }

    /// Build a raw scan predicate from a function.
    #[must_use]
    pub const fn raw(predicate: RawPredicateFn) -> Self {
        Self {
            form: PredicateForm::Raw(predicate),
        }
    }

    /// Candidate right compared against a literal.
    #[must_use]
    pub const fn right(comparison: BinaryComparison, right: OptionRight) -> Self {
        Self {
            form: PredicateForm::Comparison {
                target: PredicateTarget::Right,
                comparison,
                reference: ReferenceValue::Literal(AttributeValue::Right(right)),
            },
        }
    }

    /// Candidate strike compared against a literal.
    #[must_use]
    pub const fn strike(comparison: BinaryComparison, strike: Decimal) -> Self {
        Self {
            form: PredicateForm::Comparison {
                target: PredicateTarget::Strike,
                comparison,
                reference: ReferenceValue::Literal(AttributeValue::Strike(strike)),
            },
        }
    }

    /// Candidate expiration compared against a literal.
    #[must_use]
    pub const fn expiration(comparison: BinaryComparison, expiration: NaiveDate) -> Self {
        Self {
            form: PredicateForm::Comparison {
                target: PredicateTarget::Expiration,
                comparison,
                reference: ReferenceValue::Literal(AttributeValue::Expiration(expiration)),
            },
        }
    }

    /// Candidate strike compared against an earlier leg's strike.
    #[must_use]
    pub const fn strike_vs_leg(comparison: BinaryComparison, leg: usize) -> Self {
        Self {
            form: PredicateForm::Comparison {
                target: PredicateTarget::Strike,
                comparison,
                reference: ReferenceValue::LegAttribute {
                    leg,
                    target: PredicateTarget::Strike,
                },
            },
        }
    }

    /// Candidate expiration compared against an earlier leg's expiration.
    #[must_use]
    pub const fn expiration_vs_leg(comparison: BinaryComparison, leg: usize) -> Self {
        Self {
            form: PredicateForm::Comparison {
                target: PredicateTarget::Expiration,
                comparison,
                reference: ReferenceValue::LegAttribute {
                    leg,
                    target: PredicateTarget::Expiration,
                },
            },
        }
    }

    /// Whether this predicate decomposes as `attribute <cmp> reference` and
    /// can therefore run as an index slice.
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self.form, PredicateForm::Comparison { .. })
    }

    /// The leg index the reference reads, when introspectable.
    #[must_use]
    pub const fn referenced_leg(&self) -> Option<usize> {
        match self.form {
            PredicateForm::Comparison { reference, .. } => reference.leg_index(),
            PredicateForm::Raw(_) => None,
        }
    }

    /// Evaluate the predicate for one candidate.
    ///
    /// A candidate lacking the constrained attribute (the underlying equity
    /// has neither right, strike, nor expiration) is not a match; resolution
    /// failures never error.
    #[must_use]
    pub fn matches(&self, legs: &[OptionPosition], candidate: &OptionPosition) -> bool {
        match self.form {
            PredicateForm::Raw(predicate) => predicate(legs, candidate),
            PredicateForm::Comparison {
                target,
                comparison,
                reference,
            } => {
                let Some(resolved) = reference.resolve(legs) else {
                    return false;
                };
                let Some(actual) = attribute_of(candidate, target) else {
                    return false;
                };
                actual.compare(comparison, resolved)
            }
        }
    }

    /// Narrow a collection to the candidates satisfying this predicate,
    /// through an index slice whenever the resolved reference allows it.
    #[must_use]
    pub fn filter(
        &self,
        legs: &[OptionPosition],
        positions: &OptionPositionCollection,
        include_underlying: bool,
    ) -> OptionPositionCollection {
        if let PredicateForm::Comparison {
            comparison,
            reference,
            ..
        } = self.form
        {
            match reference.resolve(legs) {
                Some(AttributeValue::Right(right)) => match comparison {
                    BinaryComparison::Equal => {
                        return positions.slice_right(right, include_underlying);
                    }
                    BinaryComparison::NotEqual => {
                        return positions.slice_right(right.inverted(), include_underlying);
                    }
                    _ => {}
                },
                Some(AttributeValue::Strike(strike)) => {
                    return positions.slice_strike(comparison, strike, include_underlying);
                }
                Some(AttributeValue::Expiration(expiration)) => {
                    return positions.slice_expiration(comparison, expiration, include_underlying);
                }
                None => {}
            }
        }
        positions.filtered(|candidate| self.matches(legs, candidate), include_underlying)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

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

    fn collection() -> OptionPositionCollection {
        OptionPositionCollection::create(
            underlying(),
            vec![
                call(95, 3),
                call(100, 5),
                put(90, -2),
                OptionPosition::new(underlying(), 1000),
            ],
        )
    }

    #[test]
    fn candidate_on_the_right_flips_the_comparison() {
        // Authored as `100 <= candidate.strike`, stored as `strike >= 100`.
        let predicate = LegPredicate::new(
            Operand::Reference(ReferenceValue::Literal(AttributeValue::Strike(
                Decimal::new(100, 0),
            ))),
            BinaryComparison::LessThanOrEqual,
            Operand::Candidate(PredicateTarget::Strike),
        )
        .unwrap();

        assert!(predicate.matches(&[], &call(100, 1)));
        assert!(predicate.matches(&[], &call(105, 1)));
        assert!(!predicate.matches(&[], &call(95, 1)));
    }

    #[test]
    fn both_sides_candidate_is_rejected() {
        let err = LegPredicate::new(
            Operand::Candidate(PredicateTarget::Strike),
            BinaryComparison::Equal,
            Operand::Candidate(PredicateTarget::Strike),
        )
        .unwrap_err();
        assert_eq!(err, PredicateError::BothSidesCandidate);
    }

    #[test]
    fn no_candidate_operand_is_rejected() {
        let literal = ReferenceValue::Literal(AttributeValue::Strike(Decimal::new(100, 0)));
        let err = LegPredicate::new(
            Operand::Reference(literal),
            BinaryComparison::Equal,
            Operand::Reference(literal),
        )
        .unwrap_err();
        assert_eq!(err, PredicateError::NoCandidateOperand);
    }

    #[test]
    fn mismatched_operand_kinds_are_rejected() {
        let err = LegPredicate::new(
            Operand::Candidate(PredicateTarget::Strike),
            BinaryComparison::Equal,
            Operand::Reference(ReferenceValue::LegAttribute {
                leg: 0,
                target: PredicateTarget::Expiration,
            }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PredicateError::MismatchedTargets {
                candidate: PredicateTarget::Strike,
                reference: PredicateTarget::Expiration,
            }
        );
    }

    #[test]
    fn leg_attribute_resolves_against_matched_legs() {
        let predicate = LegPredicate::strike_vs_leg(BinaryComparison::GreaterThanOrEqual, 0);
        let legs = vec![call(95, 3)];
        assert!(predicate.matches(&legs, &call(100, 1)));
        assert!(!predicate.matches(&legs, &put(90, 1)));
    }

    #[test]
    fn unresolvable_attribute_is_not_a_match() {
        let strike_predicate =
            LegPredicate::strike(BinaryComparison::GreaterThan, Decimal::new(50, 0));
        let equity = OptionPosition::new(underlying(), 1000);
        assert!(!strike_predicate.matches(&[], &equity));

        // Reference to a leg that is not matched yet resolves to nothing.
        let forward = LegPredicate::strike_vs_leg(BinaryComparison::Equal, 3);
        assert!(!forward.matches(&[], &call(100, 1)));
    }

    #[test]
    fn indexed_filter_agrees_with_scan() {
        let positions = collection();
        let predicate = LegPredicate::strike(BinaryComparison::LessThan, Decimal::new(100, 0));

        let indexed = predicate.filter(&[], &positions, false);
        let scanned = positions.filtered(|p| predicate.matches(&[], p), false);
        assert_eq!(indexed, scanned);
        assert_eq!(indexed.count(), 2);
    }

    #[test]
    fn right_filter_slices_by_right() {
        let positions = collection();

        let calls = LegPredicate::right(BinaryComparison::Equal, OptionRight::Call)
            .filter(&[], &positions, false);
        assert_eq!(calls.count(), 2);

        let not_calls = LegPredicate::right(BinaryComparison::NotEqual, OptionRight::Call)
            .filter(&[], &positions, false);
        assert_eq!(not_calls.count(), 1);
    }

    #[test]
    fn raw_predicates_are_not_indexed() {
        fn long_only(_legs: &[OptionPosition], candidate: &OptionPosition) -> bool {
            candidate.is_long()
        }
        let predicate = LegPredicate::raw(long_only);
        assert!(!predicate.is_indexed());
        assert!(predicate.referenced_leg().is_none());

        let filtered = predicate.filter(&[], &collection(), false);
        assert_eq!(filtered.count(), 2);
    }

    #[test]
    fn comparison_predicates_are_indexed() {
        assert!(LegPredicate::strike(BinaryComparison::Equal, Decimal::ONE).is_indexed());
        assert_eq!(
            LegPredicate::strike_vs_leg(BinaryComparison::Equal, 2).referenced_leg(),
            Some(2)
        );
    }

    #[test]
    fn filter_keeps_underlying_on_request() {
        let positions = collection();
        let predicate = LegPredicate::strike(BinaryComparison::LessThan, Decimal::new(100, 0));
        let sliced = predicate.filter(&[], &positions, true);
        assert_eq!(sliced.underlying_quantity(), 1000);
    }
}
