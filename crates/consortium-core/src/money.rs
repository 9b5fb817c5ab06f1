use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::ConsortiumError;
use crate::types::{Money, Percent, Rate};
use crate::ConsortiumResult;

const CURRENCY_DECIMALS: u32 = 2;

/// Round a monetary amount to cents, midpoint away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a form percentage (15 = 15%) into a rate (0.15).
pub fn percent_to_rate(percent: Percent) -> Rate {
    percent / dec!(100)
}

/// Smallest whole count `n` such that `n * per_period >= total`.
///
/// Returns `None` when the count does not fit in a `u32`, including when the
/// quotient itself is beyond `Decimal` range.
pub fn ceil_count(total: Money, per_period: Money) -> ConsortiumResult<Option<u32>> {
    if per_period <= Decimal::ZERO {
        return Err(ConsortiumError::InvalidInput {
            field: "per_period".into(),
            reason: "Per-period amount must be positive".into(),
        });
    }
    let Some(periods) = total.checked_div(per_period) else {
        return Ok(None);
    };
    if periods > Decimal::from(u32::MAX) {
        return Ok(None);
    }
    Ok(periods.ceil().to_u32())
}
