use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, EnvFilter};

mod averages;
mod config;
mod db;
mod error;
mod fanout;
mod import;
mod models;
mod reference;
mod report;
mod review_id;
mod store;
mod views;

use config::Config;
use db::PgDocumentStore;
use fanout::{FanOut, ReviewEvent};
use models::{CourseAggregate, Review, UserRecord};

#[derive(Parser)]
#[command(name = "course-review-stats")]
#[command(about = "Keeps course review statistics and recent-review views in sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Register sample courses and users
    Seed,
    /// Register an empty course aggregate
    AddCourse {
        #[arg(long)]
        course: String,
    },
    /// Register a user with an empty review map
    AddUser {
        #[arg(long)]
        user: String,
    },
    /// Add a review from a JSON file and update every view
    AddReview {
        #[arg(long)]
        user: String,
        #[arg(long)]
        json: PathBuf,
    },
    /// Replace a stored review from a JSON file and update every view
    EditReview {
        #[arg(long)]
        user: String,
        #[arg(long)]
        json: PathBuf,
    },
    /// Delete a review and update every view
    DeleteReview {
        #[arg(long)]
        user: String,
        #[arg(long)]
        review_id: String,
    },
    /// Import reviews from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report for one course
    Report {
        #[arg(long)]
        course: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn read_review(path: &Path) -> anyhow::Result<Review> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid review JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    let store = PgDocumentStore::new(pool.clone());
    let fan_out = FanOut::new(&store, config.reviews_recent_total);

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&store).await?;
            println!("Seed data inserted.");
        }
        Commands::AddCourse { course } => {
            store::update_course(&store, &course, &CourseAggregate::default()).await?;
            println!("Course {course} registered.");
        }
        Commands::AddUser { user } => {
            store::set_user(&store, &UserRecord::new(user.as_str())).await?;
            println!("User {user} registered.");
        }
        Commands::AddReview { user, json } => {
            let review = read_review(&json)?;
            let review_id = review.review_id.clone();
            fan_out.apply(&user, &ReviewEvent::Add(review)).await?;
            println!("Review {review_id} added.");
        }
        Commands::EditReview { user, json } => {
            let review = read_review(&json)?;
            let review_id = review.review_id.clone();
            fan_out.apply(&user, &ReviewEvent::Edit(review)).await?;
            println!("Review {review_id} updated.");
        }
        Commands::DeleteReview { user, review_id } => {
            fan_out
                .apply(&user, &ReviewEvent::Delete(review_id.clone()))
                .await?;
            println!("Review {review_id} deleted.");
        }
        Commands::Import { csv } => {
            let inserted = import::import_csv(&store, config.reviews_recent_total, &csv).await?;
            println!("Inserted {inserted} reviews from {}.", csv.display());
        }
        Commands::Report { course, limit, out } => {
            let Some(aggregate) = store::get_course(&store, &course).await? else {
                println!("Course {course} not found.");
                return Ok(());
            };
            let recents = store::get_reviews_recent(&store, Some(&course)).await?;
            let report = report::build_report(&course, &aggregate, recents.as_ref(), limit);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
