//! Identifies named option-trading strategies inside a portfolio of option
//! positions on a single underlying equity.
//!
//! Holdings build an [`OptionPositionCollection`], a persistent container
//! indexed by right, strike, and expiration. Strategy shapes are declared as
//! [`OptionStrategyDefinition`]s: ordered legs, each with a signed unit
//! quantity and predicates that may reference earlier legs. The
//! [`OptionStrategyMatcher`] runs a backtracking search per definition,
//! pushing predicates into index slices where possible, tracking how many
//! copies of each shape fit, and subtracting accepted legs until nothing
//! more matches or a budget runs out.
//!
//! ```
//! use rust_decimal::Decimal;
//! use chrono::NaiveDate;
//! use strategy_matcher::{
//!     library, OptionPosition, OptionPositionCollection, OptionStrategyMatcher,
//!     OptionStrategyMatcherOptions, Symbol,
//! };
//!
//! let underlying = Symbol::equity("SPY");
//! let expiry = NaiveDate::from_ymd_opt(2020, 10, 16).unwrap();
//! let positions = OptionPositionCollection::create(
//!     underlying.clone(),
//!     vec![
//!         OptionPosition::new(
//!             Symbol::call(underlying.clone(), Decimal::new(95, 0), expiry),
//!             3,
//!         ),
//!         OptionPosition::new(
//!             Symbol::call(underlying.clone(), Decimal::new(100, 0), expiry),
//!             5,
//!         ),
//!     ],
//! );
//!
//! let matcher = OptionStrategyMatcher::new(
//!     OptionStrategyMatcherOptions::for_definitions(library::all()),
//! );
//! let result = matcher.match_once(&positions);
//! assert!(!result.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod comparison;
pub mod enumerator;
pub mod error;
pub mod matching;
pub mod position;
pub mod strategy;
pub mod symbol;

pub use collection::OptionPositionCollection;
pub use comparison::BinaryComparison;
pub use enumerator::EnumeratorPolicy;
pub use error::{DefinitionError, PositionError, PredicateError};
pub use matching::library;
pub use matching::{
    AttributeValue, LegDefinition, LegPredicate, MatchObjectiveFunction, Operand,
    OptionStrategyDefinition, OptionStrategyDefinitionMatch, OptionStrategyMatcher,
    OptionStrategyMatcherOptions, PredicateTarget, RawPredicateFn, ReferenceValue,
    StrategyLegMatch,
};
pub use position::OptionPosition;
pub use strategy::{OptionLeg, OrderType, Strategy, StrategyMatch, UnderlyingLeg};
pub use symbol::{OptionRight, OptionStyle, SecurityType, Symbol};
