//! Option position value object.

use std::ops::{Add, Mul, Neg};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::symbol::{OptionRight, Symbol};

/// A signed position in a single contract or in the underlying equity.
///
/// Positive quantity is long, negative is short. The default position (empty
/// symbol, zero quantity) is the additive identity: combining it with any
/// position yields the other operand. Combining positions on two different
/// non-empty symbols is a hard error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionPosition {
    symbol: Symbol,
    quantity: i64,
}

impl OptionPosition {
    /// Create a new position.
    #[must_use]
    pub const fn new(symbol: Symbol, quantity: i64) -> Self {
        Self { symbol, quantity }
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the signed quantity.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Check if this is the identity position.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbol.is_empty() && self.quantity == 0
    }

    /// Check if the position is long.
    #[must_use]
    pub const fn is_long(&self) -> bool {
        self.quantity > 0
    }

    /// Check if the position is short.
    #[must_use]
    pub const fn is_short(&self) -> bool {
        self.quantity < 0
    }

    /// Get the right of the contract. `None` on the underlying equity.
    #[must_use]
    pub fn right(&self) -> Option<OptionRight> {
        self.symbol.right()
    }

    /// Get the strike of the contract. `None` on the underlying equity.
    #[must_use]
    pub fn strike(&self) -> Option<Decimal> {
        self.symbol.strike()
    }

    /// Get the expiration of the contract. `None` on the underlying equity.
    #[must_use]
    pub fn expiration(&self) -> Option<NaiveDate> {
        self.symbol.expiration()
    }

    /// Check if the symbol carries an underlying (true for option contracts).
    #[must_use]
    pub const fn has_underlying(&self) -> bool {
        self.symbol.has_underlying()
    }

    /// Copy of this position with a different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: i64) -> Self {
        Self {
            symbol: self.symbol.clone(),
            quantity,
        }
    }

    /// Combine two positions on the same symbol by adding quantities.
    ///
    /// The identity position combines with anything; otherwise the symbols
    /// must match.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::MismatchedSymbols`] when both operands carry
    /// different non-empty symbols.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PositionError> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.symbol != other.symbol {
            return Err(PositionError::MismatchedSymbols {
                left: self.symbol.to_string(),
                right: other.symbol.to_string(),
            });
        }
        Ok(self.with_quantity(self.quantity + other.quantity))
    }
}

impl Add for OptionPosition {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when the operands carry different non-empty symbols. Use
    /// [`OptionPosition::checked_add`] to handle the mismatch.
    fn add(self, rhs: Self) -> Self {
        match self.checked_add(&rhs) {
            Ok(sum) => sum,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Neg for OptionPosition {
    type Output = Self;

    fn neg(self) -> Self {
        let quantity = -self.quantity;
        Self {
            symbol: self.symbol,
            quantity,
        }
    }
}

impl Mul<i64> for OptionPosition {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        let quantity = self.quantity * rhs;
        Self {
            symbol: self.symbol,
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn call_100() -> Symbol {
        Symbol::call(
            Symbol::equity("AAPL"),
            Decimal::new(100, 0),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        )
    }

    #[test]
    fn add_identity_left_and_right() {
        let p = OptionPosition::new(call_100(), 5);
        assert_eq!(p.clone() + OptionPosition::default(), p);
        assert_eq!(OptionPosition::default() + p.clone(), p);
    }

    #[test]
    fn add_same_symbol_merges_quantity() {
        let a = OptionPosition::new(call_100(), 5);
        let b = OptionPosition::new(call_100(), -2);
        assert_eq!(a + b, OptionPosition::new(call_100(), 3));
    }

    #[test]
    fn checked_add_mismatched_symbols() {
        let a = OptionPosition::new(call_100(), 1);
        let b = OptionPosition::new(Symbol::equity("AAPL"), 100);
        let err = a.checked_add(&b).unwrap_err();
        assert!(matches!(err, PositionError::MismatchedSymbols { .. }));
    }

    #[test]
    #[should_panic(expected = "mismatched symbols")]
    fn add_mismatched_symbols_panics() {
        let a = OptionPosition::new(call_100(), 1);
        let b = OptionPosition::new(Symbol::equity("MSFT"), 1);
        let _ = a + b;
    }

    #[test]
    fn negation_flips_sign() {
        let p = OptionPosition::new(call_100(), 4);
        assert_eq!((-p).quantity(), -4);
    }

    #[test]
    fn scalar_multiplication_scales() {
        let p = OptionPosition::new(call_100(), -2);
        assert_eq!((p * 3).quantity(), -6);
    }

    #[test]
    fn equality_is_structural() {
        let a = OptionPosition::new(call_100(), 2);
        let b = OptionPosition::new(call_100(), 2);
        let c = OptionPosition::new(call_100(), 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_attributes_absent_on_equity() {
        let p = OptionPosition::new(Symbol::equity("AAPL"), 100);
        assert_eq!(p.right(), None);
        assert_eq!(p.strike(), None);
        assert_eq!(p.expiration(), None);
        assert!(!p.has_underlying());
    }

    #[test]
    fn long_short_predicates() {
        assert!(OptionPosition::new(call_100(), 1).is_long());
        assert!(OptionPosition::new(call_100(), -1).is_short());
    }
}
