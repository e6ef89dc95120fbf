//! The built-in strategy definition library.
//!
//! Shapes with more legs come first in [`all`] so a greedy matching pass
//! cannot cannibalize a butterfly into plain spreads.

use crate::comparison::BinaryComparison;
use crate::matching::definition::{OptionStrategyDefinition, StrategyDefinitionBuilder};
use crate::matching::leg::LegDefinition;
use crate::matching::predicate::LegPredicate;
use crate::position::OptionPosition;

/// Every built-in definition, most legs first.
#[must_use]
pub fn all() -> Vec<OptionStrategyDefinition> {
    vec![
        iron_butterfly(),
        iron_condor(),
        call_butterfly(),
        put_butterfly(),
        bear_call_spread(),
        bull_call_spread(),
        bear_put_spread(),
        bull_put_spread(),
        straddle(),
        strangle(),
        call_calendar_spread(),
        put_calendar_spread(),
        covered_call(),
        protective_put(),
    ]
}

fn finished(builder: StrategyDefinitionBuilder) -> OptionStrategyDefinition {
    builder.build().expect("library definition is well formed")
}

fn same_expiration_as(leg: usize) -> LegPredicate {
    LegPredicate::expiration_vs_leg(BinaryComparison::Equal, leg)
}

/// The third strike continues the spacing set by the first two legs.
fn strikes_equally_spaced(legs: &[OptionPosition], candidate: &OptionPosition) -> bool {
    let (Some(first), Some(middle), Some(wing)) = (
        legs.first().and_then(|p| p.strike()),
        legs.get(1).and_then(|p| p.strike()),
        candidate.strike(),
    ) else {
        return false;
    };
    wing - middle == middle - first
}

/// The call wing sits as far above the body as the put wing sits below it.
fn wings_balance_the_body(legs: &[OptionPosition], candidate: &OptionPosition) -> bool {
    let (Some(body), Some(put_wing), Some(call_wing)) = (
        legs.first().and_then(|p| p.strike()),
        legs.get(2).and_then(|p| p.strike()),
        candidate.strike(),
    ) else {
        return false;
    };
    call_wing - body == body - put_wing
}

/// Long the lower-strike call, long the higher-strike call, same expiry.
#[must_use]
pub fn bear_call_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Bear Call Spread")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThanOrEqual, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Long the lower-strike call, short the higher-strike call, same expiry.
#[must_use]
pub fn bull_call_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Bull Call Spread")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::call(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThan, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Long the higher-strike put, short the lower-strike put, same expiry.
#[must_use]
pub fn bear_put_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Bear Put Spread")
            .leg(LegDefinition::put(1, Vec::new()))
            .leg(LegDefinition::put(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThan, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Short the higher-strike put, long the lower-strike put, same expiry.
#[must_use]
pub fn bull_put_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Bull Put Spread")
            .leg(LegDefinition::put(-1, Vec::new()))
            .leg(LegDefinition::put(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThan, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Long call against short put at the same strike and expiry.
#[must_use]
pub fn straddle() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Straddle")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::put(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::Equal, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Long call with a long put struck below it, same expiry.
#[must_use]
pub fn strangle() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Strangle")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::put(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThan, 0),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Long wings around a double-short body, equally spaced calls.
#[must_use]
pub fn call_butterfly() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Call Butterfly")
            .leg(LegDefinition::call(1, Vec::new()))
            .leg(LegDefinition::call(
                -2,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThanOrEqual, 0),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThanOrEqual, 1),
                    same_expiration_as(0),
                    LegPredicate::raw(strikes_equally_spaced),
                ],
            )),
    )
}

/// Long wings around a double-short body, equally spaced puts.
#[must_use]
pub fn put_butterfly() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Put Butterfly")
            .leg(LegDefinition::put(1, Vec::new()))
            .leg(LegDefinition::put(
                -2,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThanOrEqual, 0),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::put(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThanOrEqual, 1),
                    same_expiration_as(0),
                    LegPredicate::raw(strikes_equally_spaced),
                ],
            )),
    )
}

/// Short the near call, long the far call at the same strike.
#[must_use]
pub fn call_calendar_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Call Calendar Spread")
            .leg(LegDefinition::call(-1, Vec::new()))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::Equal, 0),
                    LegPredicate::expiration_vs_leg(BinaryComparison::GreaterThan, 0),
                ],
            )),
    )
}

/// Short the near put, long the far put at the same strike.
#[must_use]
pub fn put_calendar_spread() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Put Calendar Spread")
            .leg(LegDefinition::put(-1, Vec::new()))
            .leg(LegDefinition::put(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::Equal, 0),
                    LegPredicate::expiration_vs_leg(BinaryComparison::GreaterThan, 0),
                ],
            )),
    )
}

/// Long put spread below a short call spread, all one expiry.
#[must_use]
pub fn iron_condor() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Iron Condor")
            .leg(LegDefinition::put(1, Vec::new()))
            .leg(LegDefinition::put(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThan, 0),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::call(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThan, 1),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThan, 2),
                    same_expiration_as(0),
                ],
            )),
    )
}

/// Short straddle body with balanced long wings, all one expiry.
#[must_use]
pub fn iron_butterfly() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Iron Butterfly")
            .leg(LegDefinition::put(-1, Vec::new()))
            .leg(LegDefinition::call(
                -1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::Equal, 0),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::put(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::LessThan, 0),
                    same_expiration_as(0),
                ],
            ))
            .leg(LegDefinition::call(
                1,
                vec![
                    LegPredicate::strike_vs_leg(BinaryComparison::GreaterThan, 0),
                    same_expiration_as(0),
                    LegPredicate::raw(wings_balance_the_body),
                ],
            )),
    )
}

/// Short call against a lot of underlying shares.
#[must_use]
pub fn covered_call() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Covered Call")
            .underlying_lots(1)
            .leg(LegDefinition::call(-1, Vec::new())),
    )
}

/// Long put protecting a lot of underlying shares.
#[must_use]
pub fn protective_put() -> OptionStrategyDefinition {
    finished(
        OptionStrategyDefinition::builder("Protective Put")
            .underlying_lots(1)
            .leg(LegDefinition::put(1, Vec::new())),
    )
}
