// Catalog query engine: filter pipeline followed by a stable sort

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::listing::Listing;

#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("Invalid price range: floor {floor} is above ceiling {ceiling}")]
    InvalidRange { floor: i64, ceiling: i64 },

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Inclusive nightly price bounds.
///
/// The default covers every representable price. A range whose floor is above
/// its ceiling contains nothing, so a search with it returns an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub floor: i64,
    pub ceiling: i64,
}

impl PriceRange {
    pub fn new(floor: i64, ceiling: i64) -> Self {
        Self { floor, ceiling }
    }

    pub fn is_valid(&self) -> bool {
        self.floor <= self.ceiling
    }

    pub fn contains(&self, price: i64) -> bool {
        self.floor <= price && price <= self.ceiling
    }

    fn is_unbounded(&self) -> bool {
        self.floor == i64::MIN && self.ceiling == i64::MAX
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            floor: i64::MIN,
            ceiling: i64::MAX,
        }
    }
}

// Sort orders offered by the results page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "price-low")]
    PriceAscending,
    #[serde(rename = "price-high")]
    PriceDescending,
    #[serde(rename = "rating")]
    RatingDescending,
    #[serde(rename = "reviews")]
    ReviewCountDescending,
}

impl SortKey {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::PriceAscending => "price-low",
            SortKey::PriceDescending => "price-high",
            SortKey::RatingDescending => "rating",
            SortKey::ReviewCountDescending => "reviews",
        }
    }

    // Vec::sort_by is stable, so equal keys keep their catalog order
    fn sort(&self, listings: &mut [Listing]) {
        match self {
            SortKey::PriceAscending => listings.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceDescending => listings.sort_by(|a, b| b.price.cmp(&a.price)),
            // partial_cmp keeps -0.0 and 0.0 tied
            SortKey::RatingDescending => listings.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
            SortKey::ReviewCountDescending => {
                listings.sort_by(|a, b| b.review_count.cmp(&a.review_count))
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-low" => Ok(SortKey::PriceAscending),
            "price-high" => Ok(SortKey::PriceDescending),
            "rating" => Ok(SortKey::RatingDescending),
            "reviews" => Ok(SortKey::ReviewCountDescending),
            other => Err(QueryError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

// Unknown sort parameters fall back to catalog order instead of failing
fn sort_param<'de, D>(deserializer: D) -> Result<Option<SortKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let param: Option<String> = Option::deserialize(deserializer)?;
    Ok(param.and_then(|p| parse_sort_param(&p)))
}

fn parse_sort_param(param: &str) -> Option<SortKey> {
    match param.parse::<SortKey>() {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(error = %e, "falling back to catalog order");
            None
        }
    }
}

pub type Predicate<'a> = Box<dyn Fn(&Listing) -> bool + 'a>;

/// Filter criteria plus an optional sort order for one discovery request.
///
/// Empty category and amenity lists disable those filters. A `sort` of `None`
/// leaves the surviving listings in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub destination: Option<String>,
    pub price_range: PriceRange,
    /// Listing passes if it has ANY of these categories
    pub categories: Vec<String>,
    /// Listing passes only if it has ALL of these amenities
    pub amenities: Vec<String>,
    #[serde(deserialize_with = "sort_param")]
    pub sort: Option<SortKey>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn price_range(mut self, floor: i64, ceiling: i64) -> Self {
        self.price_range = PriceRange::new(floor, ceiling);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenities.push(amenity.into());
        self
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the sort order from a request parameter. Unrecognised values leave
    /// the results unsorted.
    pub fn with_sort_param(mut self, param: &str) -> Self {
        self.sort = parse_sort_param(param);
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if !self.price_range.is_valid() {
            return Err(QueryError::InvalidRange {
                floor: self.price_range.floor,
                ceiling: self.price_range.ceiling,
            });
        }
        Ok(())
    }

    /// One predicate per active criterion. Absent criteria contribute nothing.
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates: Vec<Predicate<'_>> = Vec::new();

        if let Some(needle) = self
            .destination
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::to_lowercase)
        {
            predicates.push(Box::new(move |listing: &Listing| {
                listing.region.to_lowercase().contains(&needle)
                    || listing.location.to_lowercase().contains(&needle)
            }));
        }

        if !self.price_range.is_unbounded() {
            let range = self.price_range;
            predicates.push(Box::new(move |listing: &Listing| range.contains(listing.price)));
        }

        if !self.categories.is_empty() {
            let categories = &self.categories;
            predicates.push(Box::new(move |listing: &Listing| {
                categories.iter().any(|c| listing.has_category(c))
            }));
        }

        if !self.amenities.is_empty() {
            let amenities = &self.amenities;
            predicates.push(Box::new(move |listing: &Listing| {
                amenities.iter().all(|a| listing.has_amenity(a))
            }));
        }

        predicates
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.predicates().iter().all(|p| p(listing))
    }
}

/// Filters `catalog` by every active criterion of `query`, then sorts the
/// survivors. The input slice is left untouched.
pub fn search(catalog: &[Listing], query: &Query) -> Vec<Listing> {
    if !query.price_range.is_valid() {
        warn!(
            floor = query.price_range.floor,
            ceiling = query.price_range.ceiling,
            "inverted price range matches no listings"
        );
    }

    let predicates = query.predicates();
    let mut results: Vec<Listing> = catalog
        .iter()
        .filter(|&listing| predicates.iter().all(|p| p(listing)))
        .cloned()
        .collect();

    match query.sort {
        Some(key) => key.sort(&mut results),
        None => {} // catalog order
    }

    debug!(
        catalog = catalog.len(),
        matched = results.len(),
        sort = query.sort.map(|k| k.as_param()).unwrap_or("none"),
        "search complete"
    );

    results
}
