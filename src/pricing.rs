// Stay pricing: nights, subtotal, service fee, tax and total for a date range

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const MILLIS_PER_NIGHT: i64 = 24 * 60 * 60 * 1000;
const BPS_DENOMINATOR: i64 = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid nightly rate: {0}")]
    InvalidRate(i64),

    #[error("Price calculation overflowed for rate {rate} over {nights} nights")]
    Overflow { rate: i64, nights: i64 },
}

// Fee and tax rates in basis points (1200 = 12%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub service_fee_bps: u32,
    pub tax_bps: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            service_fee_bps: 1200,
            tax_bps: 1800,
        }
    }
}

/// Itemised cost of a stay. All amounts are whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub nights: i64,
    pub subtotal: i64,
    pub service_fee: i64,
    pub tax: i64,
    pub total: i64,
}

impl PriceBreakdown {
    /// Breakdown shown before both dates are selected.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Whole nights between two instants, rounded up and never less than one.
///
/// Same-instant and inverted ranges are charged as a single night; rejecting
/// them is left to the caller.
pub fn nights_between(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
    let millis = (check_out - check_in).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    (millis + MILLIS_PER_NIGHT - 1) / MILLIS_PER_NIGHT
}

// Round half up; `amount` is never negative here
fn apply_bps(amount: i64, bps: u32) -> Option<i64> {
    amount
        .checked_mul(i64::from(bps))?
        .checked_add(BPS_DENOMINATOR / 2)
        .map(|scaled| scaled / BPS_DENOMINATOR)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Prices a stay with the default 12% service fee and 18% tax.
pub fn price(
    nightly_rate: i64,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
) -> Result<PriceBreakdown, PricingError> {
    price_with(&PricingConfig::default(), nightly_rate, check_in, check_out)
}

pub fn price_with(
    config: &PricingConfig,
    nightly_rate: i64,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
) -> Result<PriceBreakdown, PricingError> {
    price_at(
        config,
        nightly_rate,
        check_in.map(start_of_day),
        check_out.map(start_of_day),
    )
}

/// Prices a stay whose check-in and check-out carry a time of day. Partial
/// days count as a full night.
pub fn price_at(
    config: &PricingConfig,
    nightly_rate: i64,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
) -> Result<PriceBreakdown, PricingError> {
    if nightly_rate < 0 {
        return Err(PricingError::InvalidRate(nightly_rate));
    }

    let (check_in, check_out) = match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => (check_in, check_out),
        _ => return Ok(PriceBreakdown::zero()),
    };

    let nights = nights_between(check_in, check_out);
    let overflow = PricingError::Overflow {
        rate: nightly_rate,
        nights,
    };

    let subtotal = nightly_rate.checked_mul(nights).ok_or(overflow.clone())?;
    let service_fee = apply_bps(subtotal, config.service_fee_bps).ok_or(overflow.clone())?;
    let tax = apply_bps(subtotal, config.tax_bps).ok_or(overflow.clone())?;
    let total = subtotal
        .checked_add(service_fee)
        .and_then(|sum| sum.checked_add(tax))
        .ok_or(overflow)?;

    debug!(nightly_rate, nights, total, "priced stay");

    Ok(PriceBreakdown {
        nights,
        subtotal,
        service_fee,
        tax,
        total,
    })
}
