//! The outer matcher loop: greedy first-match acceptance over a library of
//! strategy definitions, under configurable budgets.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::collection::OptionPositionCollection;
use crate::enumerator::EnumeratorPolicy;
use crate::matching::definition::{
    MatchContext, OptionStrategyDefinition, OptionStrategyDefinitionMatch,
};
use crate::strategy::StrategyMatch;

const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(1);
const DEFAULT_MAX_TOTAL_MATCHES: usize = 100;

/// Configuration for [`OptionStrategyMatcher`].
#[derive(Debug, Clone)]
pub struct OptionStrategyMatcherOptions {
    /// Wall-clock budget for one `match_once` call. Checked on entry to
    /// each leg expansion; hitting it returns the partial result.
    pub max_duration: Duration,
    /// Most matches accepted in one `match_once` call.
    pub max_total_matches: usize,
    /// Most candidates considered per leg index; legs beyond the list are
    /// unlimited.
    pub max_matches_per_leg: Vec<usize>,
    /// Strategy definitions, tried in order.
    pub definitions: Vec<OptionStrategyDefinition>,
    /// Candidate ordering policy.
    pub enumerator: EnumeratorPolicy,
}

impl Default for OptionStrategyMatcherOptions {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_DURATION,
            max_total_matches: DEFAULT_MAX_TOTAL_MATCHES,
            max_matches_per_leg: Vec::new(),
            definitions: Vec::new(),
            enumerator: EnumeratorPolicy::default(),
        }
    }
}

impl OptionStrategyMatcherOptions {
    /// Default options over the given definitions.
    #[must_use]
    pub fn for_definitions(definitions: Vec<OptionStrategyDefinition>) -> Self {
        Self {
            definitions,
            ..Self::default()
        }
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub const fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Set the total match cap.
    #[must_use]
    pub const fn with_max_total_matches(mut self, max_total_matches: usize) -> Self {
        self.max_total_matches = max_total_matches;
        self
    }

    /// Set per-leg candidate caps.
    #[must_use]
    pub fn with_max_matches_per_leg(mut self, caps: Vec<usize>) -> Self {
        self.max_matches_per_leg = caps;
        self
    }

    /// Set the candidate ordering policy.
    #[must_use]
    pub const fn with_enumerator(mut self, enumerator: EnumeratorPolicy) -> Self {
        self.enumerator = enumerator;
        self
    }
}

/// Scores a complete matching. Implementations are pluggable; the greedy
/// [`OptionStrategyMatcher::match_once`] does not consume a score, and how a
/// score should drive best-match selection is deliberately left open.
pub trait MatchObjectiveFunction {
    /// Score a proposed set of matches against the input collection and the
    /// positions left unmatched.
    fn score(
        &self,
        input: &OptionPositionCollection,
        matches: &[OptionStrategyDefinitionMatch],
        unmatched: &OptionPositionCollection,
    ) -> Decimal;
}

/// Finds strategy instances in a position collection by trying each
/// definition in turn and accepting the first match it yields until none
/// remain or a budget runs out.
#[derive(Debug, Clone, Default)]
pub struct OptionStrategyMatcher {
    options: OptionStrategyMatcherOptions,
}

impl OptionStrategyMatcher {
    /// Create a matcher with the given options.
    #[must_use]
    pub const fn new(options: OptionStrategyMatcherOptions) -> Self {
        Self { options }
    }

    /// The matcher options.
    #[must_use]
    pub const fn options(&self) -> &OptionStrategyMatcherOptions {
        &self.options
    }

    /// Run one matching pass.
    ///
    /// For each definition in order, repeatedly take the first match it
    /// yields against the remaining positions and subtract the accepted
    /// legs. Hitting `max_duration` or `max_total_matches` returns the
    /// matches accepted so far; it is not an error.
    #[must_use]
    pub fn match_once(&self, positions: &OptionPositionCollection) -> StrategyMatch {
        let deadline = Instant::now() + self.options.max_duration;
        let context = MatchContext {
            deadline: Some(deadline),
            leg_caps: &self.options.max_matches_per_leg,
            enumerator: self.options.enumerator,
        };

        let mut accepted: Vec<OptionStrategyDefinitionMatch> = Vec::new();
        let mut remaining = positions.clone();
        'definitions: for definition in &self.options.definitions {
            loop {
                if accepted.len() >= self.options.max_total_matches {
                    tracing::debug!(
                        total = accepted.len(),
                        "match budget exhausted; returning partial result"
                    );
                    break 'definitions;
                }
                if context.expired() {
                    tracing::debug!(
                        total = accepted.len(),
                        "duration budget exhausted; returning partial result"
                    );
                    break 'definitions;
                }
                let mut first = None;
                definition.enumerate_matches(&remaining, context, &mut |strategy_match| {
                    first = Some(strategy_match);
                    false
                });
                let Some(strategy_match) = first else {
                    break;
                };
                tracing::debug!(
                    strategy = %definition.name(),
                    multiplier = strategy_match.multiplier(),
                    "accepted strategy match"
                );
                remaining = remaining.accept(&strategy_match);
                accepted.push(strategy_match);
            }
        }
        StrategyMatch::new(accepted, remaining)
    }
}
