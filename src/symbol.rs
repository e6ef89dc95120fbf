//! Symbol value object for instrument identifiers.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market option contracts are listed on when none is given.
pub const DEFAULT_MARKET: &str = "USA";

/// Security type of a symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    /// Common stock.
    Equity,
    /// Listed option contract.
    Option,
}

/// Option right (call or put).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionRight {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionRight {
    /// Get the opposite right.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Call => Self::Put,
            Self::Put => Self::Call,
        }
    }

    /// OCC right code (`C` or `P`).
    #[must_use]
    pub const fn occ_code(self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Option style (American or European).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionStyle {
    /// American - can be exercised any time before expiration.
    American,
    /// European - can only be exercised at expiration.
    European,
}

/// Option-specific identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId {
    /// Market the contract is listed on.
    pub market: String,
    /// Exercise style.
    pub style: OptionStyle,
    /// Call or put.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
}

/// A trading symbol: an equity ticker or a structured option contract.
///
/// The canonical `value` is the ticker for equities and an OCC-like id for
/// options (e.g. `"AAPL  250117C00150000"`). Symbols order and hash by their
/// full structure, with the canonical value leading, so collections iterate
/// in a stable, human-predictable order.
///
/// The default symbol is empty; it is the additive identity for positions.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Symbol {
    value: String,
    security_type: Option<SecurityType>,
    option: Option<OptionId>,
    underlying: Option<Box<Symbol>>,
}

impl Symbol {
    /// Create an equity symbol. The ticker is normalized to uppercase.
    #[must_use]
    pub fn equity(ticker: impl Into<String>) -> Self {
        Self {
            value: ticker.into().to_uppercase(),
            security_type: Some(SecurityType::Equity),
            option: None,
            underlying: None,
        }
    }

    /// Create an option symbol on the given underlying equity.
    ///
    /// The canonical value follows the OCC convention:
    /// root padded to six characters, `YYMMDD`, right code, strike x1000.
    #[must_use]
    pub fn option(
        underlying: Symbol,
        style: OptionStyle,
        right: OptionRight,
        strike: Decimal,
        expiration: NaiveDate,
    ) -> Self {
        let millis = (strike * Decimal::from(1000))
            .trunc()
            .to_i64()
            .unwrap_or_default();
        let value = format!(
            "{:<6}{}{}{millis:08}",
            underlying.value,
            expiration.format("%y%m%d"),
            right.occ_code(),
        );
        Self {
            value,
            security_type: Some(SecurityType::Option),
            option: Some(OptionId {
                market: DEFAULT_MARKET.to_string(),
                style,
                right,
                strike,
                expiration,
            }),
            underlying: Some(Box::new(underlying)),
        }
    }

    /// Create an American call option symbol.
    #[must_use]
    pub fn call(underlying: Symbol, strike: Decimal, expiration: NaiveDate) -> Self {
        Self::option(
            underlying,
            OptionStyle::American,
            OptionRight::Call,
            strike,
            expiration,
        )
    }

    /// Create an American put option symbol.
    #[must_use]
    pub fn put(underlying: Symbol, strike: Decimal, expiration: NaiveDate) -> Self {
        Self::option(
            underlying,
            OptionStyle::American,
            OptionRight::Put,
            strike,
            expiration,
        )
    }

    /// Set a custom listing market.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        if let Some(id) = self.option.as_mut() {
            id.market = market.into();
        }
        self
    }

    /// Get the canonical symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the security type, if the symbol is not empty.
    #[must_use]
    pub const fn security_type(&self) -> Option<SecurityType> {
        self.security_type
    }

    /// Check if this is the empty (identity) symbol.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Check if this is an option symbol.
    #[must_use]
    pub const fn is_option(&self) -> bool {
        self.option.is_some()
    }

    /// Check if this is an equity symbol.
    #[must_use]
    pub fn is_equity(&self) -> bool {
        matches!(self.security_type, Some(SecurityType::Equity))
    }

    /// Get the listing market of an option contract.
    #[must_use]
    pub fn market(&self) -> Option<&str> {
        self.option.as_ref().map(|id| id.market.as_str())
    }

    /// Get the exercise style of an option contract.
    #[must_use]
    pub fn style(&self) -> Option<OptionStyle> {
        self.option.as_ref().map(|id| id.style)
    }

    /// Get the right of an option contract.
    #[must_use]
    pub fn right(&self) -> Option<OptionRight> {
        self.option.as_ref().map(|id| id.right)
    }

    /// Get the strike of an option contract.
    #[must_use]
    pub fn strike(&self) -> Option<Decimal> {
        self.option.as_ref().map(|id| id.strike)
    }

    /// Get the expiration of an option contract.
    #[must_use]
    pub fn expiration(&self) -> Option<NaiveDate> {
        self.option.as_ref().map(|id| id.expiration)
    }

    /// Get the underlying equity symbol of an option contract.
    #[must_use]
    pub fn underlying(&self) -> Option<&Symbol> {
        self.underlying.as_deref()
    }

    /// Check if the symbol carries an underlying (true only for options).
    #[must_use]
    pub const fn has_underlying(&self) -> bool {
        self.underlying.is_some()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
