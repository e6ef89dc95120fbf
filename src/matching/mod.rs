//! Strategy definitions, leg predicates, and the matcher itself.

pub mod definition;
pub mod leg;
pub mod library;
pub mod matcher;
pub mod predicate;

pub use definition::{
    OptionStrategyDefinition, OptionStrategyDefinitionMatch, StrategyDefinitionBuilder,
    SHARES_PER_LOT,
};
pub use leg::{LegDefinition, StrategyLegMatch};
pub use matcher::{MatchObjectiveFunction, OptionStrategyMatcher, OptionStrategyMatcherOptions};
pub use predicate::{
    AttributeValue, LegPredicate, Operand, PredicateTarget, RawPredicateFn, ReferenceValue,
};
