//! Materialized strategy output records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collection::OptionPositionCollection;
use crate::matching::definition::OptionStrategyDefinitionMatch;
use crate::symbol::{OptionRight, Symbol};

/// Order type for a materialized leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order.
    #[default]
    Market,
    /// Limit order.
    Limit,
}

/// One option leg of a materialized strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLeg {
    /// Contract symbol.
    pub symbol: Symbol,
    /// Contract right.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Signed contract quantity.
    pub quantity: i64,
    /// Order type, market unless a price is negotiated downstream.
    pub order_type: OrderType,
    /// Limit price; zero for market orders.
    pub order_price: Decimal,
}

/// An underlying share leg of a materialized strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlyingLeg {
    /// Signed share quantity.
    pub quantity: i64,
}

/// A named strategy instance found in a portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Underlying equity symbol.
    pub underlying: Symbol,
    /// Option legs in matched order.
    pub option_legs: Vec<OptionLeg>,
    /// Underlying share legs, empty unless the shape requires shares.
    pub underlying_legs: Vec<UnderlyingLeg>,
}

/// The result of one matching pass: the accepted definition matches and the
/// positions left over.
#[derive(Debug, Clone)]
pub struct StrategyMatch {
    matches: Vec<OptionStrategyDefinitionMatch>,
    remaining: OptionPositionCollection,
}

impl StrategyMatch {
    pub(crate) const fn new(
        matches: Vec<OptionStrategyDefinitionMatch>,
        remaining: OptionPositionCollection,
    ) -> Self {
        Self { matches, remaining }
    }

    /// The accepted matches in acceptance order.
    #[must_use]
    pub fn matches(&self) -> &[OptionStrategyDefinitionMatch] {
        &self.matches
    }

    /// The positions no strategy consumed.
    #[must_use]
    pub const fn remaining(&self) -> &OptionPositionCollection {
        &self.remaining
    }

    /// Check whether no strategy was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Materialize every accepted match as an output strategy.
    #[must_use]
    pub fn strategies(&self) -> Vec<Strategy> {
        self.matches
            .iter()
            .map(OptionStrategyDefinitionMatch::create_strategy)
            .collect()
    }
}
