// Reservation gate: checks a selected stay before the reservation action runs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::listing::Catalog;
use crate::pricing::{price_with, PriceBreakdown, PricingConfig, PricingError};

#[derive(Error, Debug, PartialEq)]
pub enum BookingError {
    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Check-in and check-out dates are required")]
    MissingDates,

    #[error("Check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Listing {listing_id} hosts 1 to {max_guests} guests, requested {requested}")]
    InvalidGuestCount {
        listing_id: String,
        requested: u32,
        max_guests: u32,
    },

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub listing_id: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u32,
}

/// A priced stay that passed every booking precondition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub listing_id: String,
    pub listing_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub breakdown: PriceBreakdown,
}

/// Validates `request` against the catalog and prices it.
///
/// Unlike the calculator, this rejects missing dates and ranges where
/// check-out is not strictly after check-in.
pub fn quote(
    catalog: &Catalog,
    request: &ReservationRequest,
    config: &PricingConfig,
) -> Result<Quote, BookingError> {
    let listing = catalog
        .get(&request.listing_id)
        .ok_or_else(|| BookingError::ListingNotFound(request.listing_id.clone()))?;

    let (check_in, check_out) = match (request.check_in, request.check_out) {
        (Some(check_in), Some(check_out)) => (check_in, check_out),
        _ => return Err(BookingError::MissingDates),
    };

    if check_out <= check_in {
        debug!(%check_in, %check_out, "rejected date range");
        return Err(BookingError::InvalidDateRange {
            check_in,
            check_out,
        });
    }

    if request.guests == 0 || request.guests > listing.max_guests {
        return Err(BookingError::InvalidGuestCount {
            listing_id: listing.id.clone(),
            requested: request.guests,
            max_guests: listing.max_guests,
        });
    }

    let breakdown = price_with(config, listing.price, Some(check_in), Some(check_out))?;

    info!(
        listing_id = %listing.id,
        nights = breakdown.nights,
        total = breakdown.total,
        "quote ready"
    );

    Ok(Quote {
        listing_id: listing.id.clone(),
        listing_name: listing.name.clone(),
        check_in,
        check_out,
        guests: request.guests,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SAMPLE_CATALOG_PATH;
    use test_case::test_case;

    fn request(listing_id: &str, check_in: &str, check_out: &str, guests: u32) -> ReservationRequest {
        ReservationRequest {
            listing_id: listing_id.to_string(),
            check_in: NaiveDate::parse_from_str(check_in, "%Y-%m-%d").ok(),
            check_out: NaiveDate::parse_from_str(check_out, "%Y-%m-%d").ok(),
            guests,
        }
    }

    fn catalog() -> Catalog {
        Catalog::load(SAMPLE_CATALOG_PATH).unwrap()
    }

    #[test]
    fn test_quote_for_valid_stay() {
        let quote = quote(
            &catalog(),
            &request("1", "2024-03-15", "2024-03-17", 2),
            &PricingConfig::default(),
        )
        .unwrap();

        assert_eq!(quote.listing_name, "Himalayan Base Camp Experience");
        assert_eq!(quote.guests, 2);
        assert_eq!(quote.breakdown.nights, 2);
        assert_eq!(quote.breakdown.total, 6500);
    }

    #[test]
    fn test_unknown_listing() {
        let result = quote(
            &catalog(),
            &request("42", "2024-03-15", "2024-03-17", 2),
            &PricingConfig::default(),
        );
        assert_eq!(result, Err(BookingError::ListingNotFound("42".to_string())));
    }

    #[test_case("", "2024-03-17"; "no check-in")]
    #[test_case("2024-03-15", ""; "no check-out")]
    #[test_case("", ""; "no dates")]
    fn test_missing_dates(check_in: &str, check_out: &str) {
        let result = quote(
            &catalog(),
            &request("1", check_in, check_out, 2),
            &PricingConfig::default(),
        );
        assert_eq!(result, Err(BookingError::MissingDates));
    }

    #[test_case("2024-03-15", "2024-03-15"; "same day")]
    #[test_case("2024-03-17", "2024-03-15"; "inverted")]
    fn test_invalid_date_range(check_in: &str, check_out: &str) {
        let result = quote(
            &catalog(),
            &request("1", check_in, check_out, 2),
            &PricingConfig::default(),
        );
        assert!(matches!(result, Err(BookingError::InvalidDateRange { .. })));
    }

    #[test_case(0; "no guests")]
    #[test_case(5; "above max occupancy")]
    fn test_invalid_guest_count(guests: u32) {
        // listing 2 hosts up to 4
        let result = quote(
            &catalog(),
            &request("2", "2024-03-15", "2024-03-16", guests),
            &PricingConfig::default(),
        );
        assert_eq!(
            result,
            Err(BookingError::InvalidGuestCount {
                listing_id: "2".to_string(),
                requested: guests,
                max_guests: 4,
            })
        );
    }

    #[test]
    fn test_max_occupancy_is_allowed() {
        let result = quote(
            &catalog(),
            &request("2", "2024-03-15", "2024-03-16", 4),
            &PricingConfig::default(),
        );
        assert!(result.is_ok());
    }
}
