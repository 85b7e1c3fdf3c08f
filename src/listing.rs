// Campsite listings and the read-only catalog they are queried from

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::search::{search, Query};

// Error types for catalog loading
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Duplicate listing id: {0}")]
    DuplicateId(String),

    #[error("Invalid listing {id}: {reason}")]
    InvalidListing { id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub name: String,
    pub joined_date: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single bookable campsite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    /// Free-text location, e.g. "Manali, Himachal Pradesh"
    pub location: String,
    /// Region used for coarse destination matching
    #[serde(rename = "state")]
    pub region: String,
    /// Nightly price in whole currency units
    pub price: i64,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub description: String,
    /// Gallery image paths, first one is the cover
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "campingTypes")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(rename = "maxGuests")]
    pub max_guests: u32,
    #[serde(default)]
    pub host: Option<Host>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Dates the host has marked as open
    #[serde(default)]
    pub availability: Vec<NaiveDate>,
}

impl Listing {
    pub fn has_amenity(&self, amenity: &str) -> bool {
        self.amenities.iter().any(|a| a == amenity)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.availability.contains(&date)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidListing {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.categories.is_empty() {
            return Err(invalid("no categories"));
        }
        if self.price < 0 {
            return Err(invalid("negative price"));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(invalid("rating outside 0.0-5.0"));
        }
        if self.max_guests == 0 {
            return Err(invalid("max guests must be positive"));
        }
        Ok(())
    }
}

/// Fixed collection of listings, kept in load order and indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    listings: Vec<Listing>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(listings: Vec<Listing>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(listings.len());
        for (position, listing) in listings.iter().enumerate() {
            listing.validate()?;
            if index.insert(listing.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(listing.id.clone()));
            }
        }

        Ok(Self { listings, index })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let listings: Vec<Listing> = serde_json::from_str(json)?;
        Self::new(listings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        debug!(path = %path.display(), listings = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.index.get(id).map(|&position| &self.listings[position])
    }

    /// The first `count` listings in catalog order.
    pub fn featured(&self, count: usize) -> &[Listing] {
        &self.listings[..count.min(self.listings.len())]
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn search(&self, query: &Query) -> Vec<Listing> {
        search(&self.listings, query)
    }
}

// Sample catalog shipped with the crate
pub const SAMPLE_CATALOG_PATH: &str = "samples/catalog.json";
