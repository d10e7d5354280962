#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the field mapper toolchain.

use clap::{Parser, Subcommand};
use field_mapper_campaign_models::Campaign;
use field_mapper_database::{campaigns, db, run_migrations};
use field_mapper_extract::pipeline::{ExtractOptions, extract_shapefile};
use field_mapper_extract::{overpass, registry};
use field_mapper_extract_models::BoundingBox;

#[derive(Parser)]
#[command(name = "field_mapper", about = "Campaign manager and OSM extract toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an OSM extract for a feature and bounding box (cache-aware)
    Fetch {
        /// Feature identifier (e.g. "buildings", "roads", "boundary-4")
        feature: String,
        /// Bounding box as `"sw_lat,sw_lng,ne_lat,ne_lng"`
        bbox: BoundingBox,
    },
    /// Fetch an extract and convert it to a zipped shapefile package
    Extract {
        /// Feature identifier (e.g. "buildings", "roads", "boundary-4")
        feature: String,
        /// Bounding box as `"sw_lat,sw_lng,ne_lat,ne_lng"`
        bbox: BoundingBox,
        /// Output name prefix; only `[A-Za-z0-9-_]` characters are allowed
        #[arg(long, default_value = "")]
        prefix: String,
        /// Language for the bundled style and metadata files
        #[arg(long, default_value = "en")]
        lang: String,
        /// QGIS major version for the bundled `.qml` style (1 = legacy)
        #[arg(long, default_value = "2")]
        qgis_version: u32,
        /// Downstream application version used to resolve metadata files
        #[arg(long)]
        app_version: Option<String>,
    },
    /// List all configured extract features
    Features,
    /// Run database migrations
    Migrate,
    /// List campaigns
    Campaigns {
        /// Only list campaigns that are active today
        #[arg(long)]
        active: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { feature, bbox } => {
            let client = overpass::build_client()?;
            let path = overpass::fetch_osm_extract(&client, &feature, bbox).await?;
            println!("{}", path.display());
        }
        Commands::Extract {
            feature,
            bbox,
            prefix,
            lang,
            qgis_version,
            app_version,
        } => {
            let definition = registry::find_feature(&feature)
                .ok_or_else(|| format!("Unknown feature: {feature}"))?;

            let client = overpass::build_client()?;
            let osm_path = overpass::fetch_osm_extract(&client, &feature, bbox).await?;

            let options = ExtractOptions {
                output_prefix: prefix,
                qgis_version,
                app_version,
                lang,
            };
            let zip_path = extract_shapefile(&definition, &osm_path, &options)?;
            println!("{}", zip_path.display());
        }
        Commands::Features => {
            let features = registry::all_features();
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for feature in &features {
                println!("{:<20} {}", feature.id(), feature.name());
            }
        }
        Commands::Migrate => {
            log::info!("Running database migrations...");
            let db = db::connect_from_env().await?;
            run_migrations(db.as_ref()).await?;
            log::info!("Migrations complete.");
        }
        Commands::Campaigns { active } => {
            let db = db::connect_from_env().await?;
            run_migrations(db.as_ref()).await?;

            let rows = if active {
                campaigns::get_active_campaigns(db.as_ref()).await?
            } else {
                campaigns::get_all_campaigns(db.as_ref()).await?
            };

            println!("{:<38} {:<24} ACTIVE WINDOW", "UUID", "NAME");
            println!("{}", "-".repeat(90));
            for campaign in &rows {
                print_campaign(campaign);
            }
        }
    }

    Ok(())
}

fn print_campaign(campaign: &Campaign) {
    println!(
        "{:<38} {:<24} {} .. {}",
        campaign.uuid,
        campaign.name,
        campaign.start_date.format("%Y-%m-%d"),
        campaign.end_date.format("%Y-%m-%d"),
    );
}
