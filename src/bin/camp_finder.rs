use anyhow::Context;
use camp_finder::{quote, Catalog, PricingConfig, Query, ReservationRequest};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camp_finder")]
#[command(about = "Search the campsite catalog and price a stay.")]
struct CommandLine {
    /// Catalog JSON file
    #[arg(long, default_value = camp_finder::SAMPLE_CATALOG_PATH)]
    catalog: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List campsites matching the given filters
    #[command(alias = "s")]
    Search {
        #[arg(long)]
        destination: Option<String>,
        #[arg(long, default_value_t = i64::MIN, allow_hyphen_values = true)]
        min_price: i64,
        #[arg(long, default_value_t = i64::MAX, allow_hyphen_values = true)]
        max_price: i64,
        /// Camping type, repeatable (any match)
        #[arg(long = "type")]
        types: Vec<String>,
        /// Amenity, repeatable (all required)
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        /// price-low, price-high, rating or reviews
        #[arg(long, default_value = "price-low")]
        sort: String,
    },
    /// Price a stay at one campsite
    #[command(alias = "q")]
    Quote {
        id: String,
        #[arg(long)]
        check_in: Option<NaiveDate>,
        #[arg(long)]
        check_out: Option<NaiveDate>,
        #[arg(long, default_value_t = 2)]
        guests: u32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let commands = CommandLine::parse();
    let catalog = Catalog::load(&commands.catalog)
        .with_context(|| format!("failed to load catalog from {}", commands.catalog))?;
    info!("Loaded {} campsites", catalog.len());

    match commands.command {
        Commands::Search {
            destination,
            min_price,
            max_price,
            types,
            amenities,
            sort,
        } => {
            let query = Query {
                destination,
                categories: types,
                amenities,
                ..Query::new()
            }
            .price_range(min_price, max_price)
            .with_sort_param(&sort);

            let results = catalog.search(&query);
            info!("{} result(s)", results.len());

            for (i, listing) in results.iter().enumerate() {
                println!("{}. {} ({} / night)", i + 1, listing.name, listing.price);
                println!("   {} | {:.1} ({} reviews)", listing.location, listing.rating, listing.review_count);
                println!("   Types: {}", listing.categories.join(", "));
                println!("   ID: {}", listing.id);
                println!();
            }
        }
        Commands::Quote {
            id,
            check_in,
            check_out,
            guests,
        } => {
            let request = ReservationRequest {
                listing_id: id,
                check_in,
                check_out,
                guests,
            };
            let quote = quote(&catalog, &request, &PricingConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_bounds_parse() {
        let commands = CommandLine::try_parse_from([
            "camp_finder",
            "search",
            "--min-price",
            "-100",
            "--max-price",
            "-1",
        ])
        .unwrap();

        match commands.command {
            Commands::Search {
                min_price,
                max_price,
                ..
            } => {
                assert_eq!(min_price, -100);
                assert_eq!(max_price, -1);
            }
            Commands::Quote { .. } => panic!("expected search command"),
        }
    }

    #[test]
    fn test_search_defaults() {
        let commands = CommandLine::try_parse_from(["camp_finder", "search"]).unwrap();
        assert_eq!(commands.catalog, camp_finder::SAMPLE_CATALOG_PATH);

        match commands.command {
            Commands::Search {
                min_price,
                max_price,
                sort,
                ..
            } => {
                assert_eq!((min_price, max_price), (i64::MIN, i64::MAX));
                assert_eq!(sort, "price-low");
            }
            Commands::Quote { .. } => panic!("expected search command"),
        }
    }
}
