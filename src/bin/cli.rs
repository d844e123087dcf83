// Shelf - Smart shelves for a personal media library
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelf_core::rules::{RuleCompiler, RuleGroup};
use shelf_core::storage::{queries, Database};
use shelf_core::ShelfConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shelf-cli")]
#[command(about = "Shelf CLI - evaluate smart shelf rules against a catalog", long_about = None)]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database, overrides config and SHELF_DATABASE
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database (and optionally a library and a user)
    Init {
        #[arg(long)]
        library: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Check that a rule tree file is well-formed
    Validate {
        /// Rule tree JSON file
        rules: PathBuf,
    },
    /// List the books a rule tree matches
    Query {
        /// Rule tree JSON file
        rules: PathBuf,
        /// Acting user id, defaults to the configured user
        #[arg(short, long)]
        user: Option<i64>,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show catalog and database statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ShelfConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }
    init_logging(&config);

    match cli.command {
        Commands::Init { library, user } => init(&config, library, user).await,
        Commands::Validate { rules } => validate(&config, &rules),
        Commands::Query { rules, user, json } => {
            query(&config, &rules, user.unwrap_or(config.default_user_id), json).await
        }
        Commands::Stats => stats(&config).await,
    }
}

fn init_logging(config: &ShelfConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_rules(path: &Path) -> Result<RuleGroup> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule tree {}", path.display()))?;
    let tree = RuleGroup::from_json(&json)
        .with_context(|| format!("Invalid rule tree in {}", path.display()))?;
    Ok(tree)
}

async fn open(config: &ShelfConfig) -> Result<Database> {
    let path = config.database_path();
    Database::new(&path)
        .await
        .with_context(|| format!("Failed to open catalog database {}", path.display()))
}

async fn init(config: &ShelfConfig, library: Option<String>, user: Option<String>) -> Result<()> {
    let db = open(config).await?;
    println!("Catalog database ready at {}", config.database_path().display());

    if let Some(name) = library {
        let id = queries::insert_library(db.pool(), &name).await?;
        println!("Created library '{}' (id {})", name, id);
    }
    if let Some(name) = user {
        let id = queries::insert_user(db.pool(), &name).await?;
        println!("Created user '{}' (id {})", name, id);
    }

    db.close().await?;
    Ok(())
}

fn validate(config: &ShelfConfig, rules: &Path) -> Result<()> {
    let tree = read_rules(rules)?;
    let filter = RuleCompiler::new(config.default_user_id).compile(&tree);

    println!("✓ Rule tree is valid");
    println!("  Rules: {}", tree.rule_count());
    println!("  Depth: {}", tree.depth());
    if filter.is_unrestricted() {
        println!("  Note: this shelf matches every book");
    }
    Ok(())
}

async fn query(config: &ShelfConfig, rules: &Path, user_id: i64, json: bool) -> Result<()> {
    let tree = read_rules(rules)?;
    let filter = RuleCompiler::new(user_id).compile(&tree);

    let db = open(config).await?;
    let books = queries::find_matching_books(db.pool(), &filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
    } else {
        for record in &books {
            let book = &record.book;
            match (book.series_key(), book.series_number) {
                (Some(series), Some(number)) => {
                    println!("{:>6}  {} ({} #{})", book.book_id, book.title, series, number)
                }
                (Some(series), None) => println!("{:>6}  {} ({})", book.book_id, book.title, series),
                _ => println!("{:>6}  {}", book.book_id, book.title),
            }
        }
        println!("{} book(s) matched", books.len());
    }

    db.close().await?;
    Ok(())
}

async fn stats(config: &ShelfConfig) -> Result<()> {
    let db = open(config).await?;
    let catalog = queries::get_catalog_stats(db.pool()).await?;
    let storage = db.get_stats().await?;

    println!("Catalog");
    println!("  Libraries:     {}", catalog.libraries);
    println!("  Users:         {}", catalog.users);
    println!("  Books:         {}", catalog.books);
    println!("  Series:        {}", catalog.series);
    println!("  Files:         {}", catalog.files);
    println!("  Progress rows: {}", catalog.progress_rows);
    println!("Database");
    println!("  Size:          {} bytes", storage.total_size);
    println!("  Unused:        {:.1}%", storage.unused_percentage());
    println!(
        "  Integrity:     {}",
        if db.check_integrity().await? { "ok" } else { "FAILED" }
    );

    db.close().await?;
    Ok(())
}
