//! Errors surfaced at construction time.
//!
//! Runtime matching never errors: a candidate that cannot satisfy a
//! predicate (for example the underlying equity, which has no strike) is
//! simply not a match, and exhausting a search budget returns a partial
//! result. Everything in this module is detected while building positions,
//! predicates, or definitions, and fails loudly.

use thiserror::Error;

use crate::matching::predicate::PredicateTarget;

/// Errors combining positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Two positions on different symbols were combined.
    #[error("cannot combine positions on mismatched symbols '{left}' and '{right}'")]
    MismatchedSymbols {
        /// Symbol of the left operand.
        left: String,
        /// Symbol of the right operand.
        right: String,
    },
}

/// Errors authoring a leg predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// Both sides of the comparison reference the candidate position.
    #[error("both comparison operands reference the candidate position")]
    BothSidesCandidate,

    /// Neither side of the comparison references the candidate position.
    #[error("neither comparison operand references the candidate position")]
    NoCandidateOperand,

    /// The candidate attribute and the comparand are of different kinds.
    #[error("candidate {candidate} compared against a {reference} comparand")]
    MismatchedTargets {
        /// Attribute the candidate side names.
        candidate: PredicateTarget,
        /// Attribute kind of the reference side.
        reference: PredicateTarget,
    },
}

/// Errors building a strategy definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition declares no legs.
    #[error("strategy definition '{name}' has no legs")]
    NoLegs {
        /// Definition name.
        name: String,
    },

    /// A leg predicate references a leg that is matched later than itself.
    #[error(
        "strategy definition '{name}' leg {leg} references leg {referenced}, \
         which is not matched yet"
    )]
    ForwardLegReference {
        /// Definition name.
        name: String,
        /// Index of the offending leg.
        leg: usize,
        /// Leg index the predicate refers to.
        referenced: usize,
    },
}
