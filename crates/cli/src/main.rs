use anyhow::{anyhow, Context, Result};
use catalog::{CarListing, JsonListingSource, ListingId};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use favorites::{FavoritesLedger, Identity, JsonFileStore, ToggleOutcome};
use pipeline::FilterCriteria;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storefront::{Storefront, StorefrontError};
use tracing::info;

/// Car Market - browse, search and favorite car listings
#[derive(Parser)]
#[command(name = "car-market")]
#[command(about = "Browse and favorite car listings from a JSON catalog", long_about = None)]
struct Cli {
    /// Path to the JSON listing catalog
    #[arg(long, default_value = "data/cars.json")]
    catalog: PathBuf,

    /// Path to the JSON identity/favorites store
    #[arg(long, default_value = "data/identities.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List listings matching the given filters
    Browse(BrowseArgs),

    /// Show one listing in detail
    Show {
        #[arg(long)]
        id: String,
    },

    /// Show the filter options available in the catalog
    Facets,

    /// Start a session for a user
    Login {
        #[arg(long)]
        user: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// End the current session
    Logout,

    /// Add or remove a listing from the signed-in user's favorites
    Favorite {
        #[arg(long)]
        id: String,
    },

    /// List the signed-in user's favorites
    Favorites {
        /// Text search over make, model and year
        #[arg(long)]
        query: Option<String>,
    },

    /// Run benchmark to test filtering performance
    Benchmark {
        /// Number of filter requests to make
        #[arg(long, default_value = "100")]
        iterations: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "1")]
        concurrent: usize,
    },
}

#[derive(Args)]
struct BrowseArgs {
    /// Text search over make, model and year
    #[arg(long)]
    query: Option<String>,

    /// Category tag ("all" for every category)
    #[arg(long)]
    category: Option<String>,

    /// Make to include (repeatable)
    #[arg(long = "make")]
    makes: Vec<String>,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    #[arg(long)]
    min_year: Option<u16>,

    #[arg(long)]
    max_year: Option<u16>,

    /// Fuel type to include (repeatable)
    #[arg(long = "fuel")]
    fuel_types: Vec<String>,

    /// Transmission to include (repeatable)
    #[arg(long = "transmission")]
    transmissions: Vec<String>,
}

impl BrowseArgs {
    fn into_criteria(self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new()
            .with_price(self.min_price, self.max_price)
            .with_year(self.min_year, self.max_year);
        if let Some(query) = self.query {
            criteria = criteria.with_query(query);
        }
        if let Some(category) = self.category {
            criteria = criteria.with_category(category);
        }
        criteria.makes.extend(self.makes);
        criteria.fuel_types.extend(self.fuel_types);
        criteria.transmissions.extend(self.transmissions);
        criteria
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = Arc::new(JsonFileStore::new(&cli.store));
    let ledger = Arc::new(FavoritesLedger::new(store.clone()));
    let source = Arc::new(JsonListingSource::new(&cli.catalog));
    let storefront = Arc::new(Storefront::new(source, ledger));

    match cli.command {
        Commands::Login { user, name, email } => {
            let mut identity = Identity::new(user);
            if let Some(name) = name {
                identity = identity.with_display_name(name);
            }
            if let Some(email) = email {
                identity = identity.with_email(email);
            }
            store
                .sign_in(identity)
                .await
                .context("Failed to start session")?;
            storefront.restore_session().await?;
            let snapshot = storefront.snapshot();
            if let Some(identity) = snapshot.identity {
                println!(
                    "{} Signed in as {} ({} favorites)",
                    "✓".green(),
                    identity.label().bold(),
                    snapshot.favorite_count
                );
            }
        }
        Commands::Logout => {
            store.sign_out().await.context("Failed to end session")?;
            println!("{} Signed out", "✓".green());
        }
        command => {
            load(&storefront).await?;
            storefront.restore_session().await?;
            match command {
                Commands::Browse(args) => handle_browse(&storefront, args.into_criteria()).await?,
                Commands::Show { id } => handle_show(&storefront, ListingId::from(id)).await?,
                Commands::Facets => handle_facets(&storefront),
                Commands::Favorite { id } => {
                    handle_favorite(&storefront, ListingId::from(id)).await?
                }
                Commands::Favorites { query } => handle_favorites(&storefront, query.as_deref()),
                Commands::Benchmark {
                    iterations,
                    concurrent,
                } => handle_benchmark(storefront.clone(), iterations, concurrent).await?,
                Commands::Login { .. } | Commands::Logout => {}
            }
        }
    }

    Ok(())
}

async fn load(storefront: &Storefront) -> Result<()> {
    let start = Instant::now();
    storefront
        .load_catalog()
        .await
        .context("Failed to load catalog")?;
    info!(
        "Loaded {} listings in {:?}",
        storefront.snapshot().total,
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'browse' command
async fn handle_browse(storefront: &Storefront, criteria: FilterCriteria) -> Result<()> {
    storefront.set_criteria(criteria).await?;
    let snapshot = storefront.snapshot();

    let badge = if snapshot.active_filter_count > 0 {
        format!(" [{} filters]", snapshot.active_filter_count)
    } else {
        String::new()
    };
    println!(
        "{}{}",
        format!("{} of {} listings", snapshot.listings.len(), snapshot.total)
            .bold()
            .blue(),
        badge.yellow()
    );
    for listing in &snapshot.listings {
        print_listing_line(listing, storefront.is_favorite(&listing.id));
    }
    Ok(())
}

/// Handle the 'show' command
async fn handle_show(storefront: &Storefront, id: ListingId) -> Result<()> {
    let listing = storefront.select_listing(&id).await?;
    let marker = if storefront.is_favorite(&id) {
        " ★".yellow().to_string()
    } else {
        String::new()
    };

    println!("{}{}", listing.title().bold().blue(), marker);
    println!("{}Id: {}", "• ".green(), listing.id);
    println!("{}Price: {:.2}", "• ".green(), listing.price);
    if !listing.category.is_empty() {
        println!("{}Category: {}", "• ".green(), listing.category);
    }
    if !listing.fuel_type.is_empty() {
        println!("{}Fuel: {}", "• ".green(), listing.fuel_type);
    }
    if !listing.transmission.is_empty() {
        println!("{}Transmission: {}", "• ".green(), listing.transmission);
    }
    if let Some(mileage) = listing.mileage {
        println!("{}Mileage: {}", "• ".green(), mileage);
    }
    if let Some(rating) = listing.rating {
        println!("{}Rating: {:.1}", "• ".green(), rating);
    }
    if !listing.available {
        println!("{}", "Currently unavailable".red());
    }
    if !listing.features.is_empty() {
        println!("Features: {}", listing.features.join(", "));
    }
    if !listing.description.is_empty() {
        println!("\n{}", listing.description);
    }
    Ok(())
}

/// Handle the 'facets' command
fn handle_facets(storefront: &Storefront) {
    let facets = storefront.facets();
    println!("{}", "Filter options:".bold().blue());
    println!("{}Makes: {}", "• ".green(), facets.makes.join(", "));
    println!("{}Categories: {}", "• ".green(), facets.categories.join(", "));
    println!("{}Fuel types: {}", "• ".green(), facets.fuel_types.join(", "));
    println!(
        "{}Transmissions: {}",
        "• ".green(),
        facets.transmissions.join(", ")
    );
    if let Some((low, high)) = facets.price_bounds {
        println!("{}Price: {:.0} - {:.0}", "• ".cyan(), low, high);
    }
    if let Some((low, high)) = facets.year_bounds {
        println!("{}Year: {} - {}", "• ".cyan(), low, high);
    }
}

/// Handle the 'favorite' command
async fn handle_favorite(storefront: &Storefront, id: ListingId) -> Result<()> {
    let title = storefront
        .listing(&id)
        .map(|listing| listing.title())
        .ok_or_else(|| anyhow!("Listing {} not found", id))?;

    match storefront.toggle_favorite(&id).await {
        Ok(ToggleOutcome::Added) => println!("{} Added {}", "★".yellow(), title),
        Ok(ToggleOutcome::Removed) => println!("{} Removed {}", "☆".normal(), title),
        Err(StorefrontError::AuthRequired) => {
            return Err(anyhow!("Not signed in; run `car-market login --user <id>` first"));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Handle the 'favorites' command
fn handle_favorites(storefront: &Storefront, query: Option<&str>) {
    let snapshot = storefront.snapshot();
    let Some(identity) = snapshot.identity else {
        println!("{}", "Not signed in".red());
        return;
    };

    let listings = storefront.favorite_listings(query);
    println!(
        "{}",
        format!("Favorites of {} ({})", identity.label(), listings.len())
            .bold()
            .blue()
    );
    for listing in &listings {
        print_listing_line(listing, true);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    storefront: Arc<Storefront>,
    iterations: usize,
    concurrent: usize,
) -> Result<()> {
    let facets = storefront.facets();
    if facets.makes.is_empty() {
        return Err(anyhow!("Catalog is empty, nothing to benchmark"));
    }

    let batches: Vec<Vec<FilterCriteria>> = {
        let criteria: Vec<FilterCriteria> = (0..iterations)
            .map(|_| random_criteria(&facets))
            .collect();
        criteria
            .chunks(concurrent.max(1))
            .map(<[FilterCriteria]>::to_vec)
            .collect()
    };

    let start = Instant::now();
    let mut timings: Vec<Duration> = Vec::with_capacity(iterations);
    let mut published = 0usize;
    for batch in batches {
        let mut handles = Vec::with_capacity(batch.len());
        for criteria in batch {
            let storefront = storefront.clone();
            handles.push(tokio::spawn(async move {
                let start = Instant::now();
                let shown = storefront.set_criteria(criteria).await?;
                Ok::<_, anyhow::Error>((start.elapsed(), shown))
            }));
        }
        for handle in handles {
            let (elapsed, shown) = handle.await??;
            timings.push(elapsed);
            published += usize::from(shown);
        }
    }
    let total_time = start.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }
    timings.sort();
    let sum: Duration = timings.iter().sum();
    let avg_latency = sum / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / total_time.as_secs_f64()
    );
    println!(
        "Published: {} of {} (the rest were superseded)",
        published,
        timings.len()
    );
    Ok(())
}

/// Criteria drawn from the catalog's own facet values
fn random_criteria(facets: &catalog::CatalogFacets) -> FilterCriteria {
    let mut rng = rand::rng();
    let mut criteria = FilterCriteria::new();

    if rng.random_bool(0.5) {
        let make = &facets.makes[rng.random_range(0..facets.makes.len())];
        criteria = criteria.with_make(make.clone());
    }
    if !facets.fuel_types.is_empty() && rng.random_bool(0.3) {
        let fuel = &facets.fuel_types[rng.random_range(0..facets.fuel_types.len())];
        criteria = criteria.with_fuel_type(fuel.clone());
    }
    if let Some((low, high)) = facets.price_bounds {
        if rng.random_bool(0.5) && high > low {
            criteria = criteria.with_price(None, Some(rng.random_range(low..=high)));
        }
    }
    if let Some((low, high)) = facets.year_bounds {
        if rng.random_bool(0.3) {
            criteria = criteria.with_year(Some(rng.random_range(low..=high)), None);
        }
    }
    criteria
}

fn print_listing_line(listing: &CarListing, favorite: bool) {
    let marker = if favorite {
        "★".yellow()
    } else {
        " ".normal()
    };
    let details = [
        listing.category.as_str(),
        listing.fuel_type.as_str(),
        listing.transmission.as_str(),
    ]
    .into_iter()
    .filter(|value| !value.is_empty())
    .collect::<Vec<_>>()
    .join(", ");

    println!(
        "{} {} {} [{}] - {}",
        marker,
        listing.id.to_string().green(),
        listing.title(),
        details,
        format!("{:.2}", listing.price).cyan()
    );
}
