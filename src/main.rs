//! regdoc main entry point
//!
//! This is the command-line interface for the regulatory document pipeline.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use regdoc::config::{load_config_with_hash, Config};
use regdoc::context::{AppContext, CrawlOptions};
use regdoc::index::{run_search, SearchQuery, DEFAULT_SEARCH_SIZE};
use regdoc::ingest::IngestMethod;
use regdoc::output::{
    print_config, print_crawl_report, print_download_report, print_indices,
    print_ingest_summary, print_json, print_manifest, print_search_result, CrawlReport,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// regdoc: crawl, download and index regulatory documents
///
/// regdoc discovers documents on paginated listing pages, downloads them,
/// normalizes their text or structured JSON into search documents and loads
/// them into Elasticsearch.
#[derive(Parser, Debug)]
#[command(name = "regdoc")]
#[command(version = "1.0.0")]
#[command(about = "Regulatory document crawl-and-ingest pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover document links on the listing pages
    Crawl {
        /// Seed URL (overrides the configuration)
        #[arg(long)]
        seed: Option<String>,

        /// Maximum listing pages to fetch (overrides the configuration)
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Discard the persisted link set first
        #[arg(long)]
        fresh: bool,
    },

    /// Download the documents of the persisted link set
    Download,

    /// Crawl, then download
    Scrape {
        #[arg(long)]
        seed: Option<String>,

        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Extract the allowed entries of a ZIP archive
    Unpack {
        zip: PathBuf,

        /// Extraction directory (defaults to the download directory)
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Normalize a directory of files and bulk-index the records
    Ingest {
        /// Directory to read (defaults to the download directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        method: IngestMethod,

        #[arg(long)]
        index: Option<String>,
    },

    /// Create the index with the regulatory mapping
    CreateIndex {
        #[arg(long)]
        index: Option<String>,
    },

    /// List the indices with document counts and health
    ListIndices,

    /// Delete an index and all its documents
    DeleteIndex {
        index: String,
    },

    /// Search the index
    Search {
        text: String,

        /// Field to match, or _all for the weighted multi-field query
        #[arg(long, default_value = "_all")]
        field: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_SIZE)]
        size: usize,

        #[arg(long)]
        index: Option<String>,
    },

    /// Print a document
    Get {
        id: String,

        #[arg(long)]
        index: Option<String>,
    },

    /// Create or replace a document from a JSON file
    Put {
        id: String,
        file: PathBuf,

        #[arg(long)]
        index: Option<String>,
    },

    /// Merge the fields of a JSON file into an existing document
    Update {
        id: String,
        file: PathBuf,

        #[arg(long)]
        index: Option<String>,
    },

    /// Delete a document
    Delete {
        id: String,

        #[arg(long)]
        index: Option<String>,
    },

    /// Check connectivity to the search engine
    Check,

    /// Validate and print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Command::ShowConfig = cli.command {
        return handle_show_config(&config, cli.json);
    }

    let ctx = AppContext::new(config).context("failed to initialize")?;
    run(&ctx, cli.command, cli.json).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("regdoc=info,warn"),
            1 => EnvFilter::new("regdoc=debug,info"),
            2 => EnvFilter::new("regdoc=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn handle_show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(config)?;
    } else {
        print_config(config);
        println!("\n✓ Configuration is valid");
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Command, json: bool) -> anyhow::Result<()> {
    let default_index = ctx.config().search.index.clone();

    match command {
        Command::Crawl {
            seed,
            max_iterations,
            fresh,
        } => {
            let options = CrawlOptions {
                seed_url: seed,
                max_iterations,
                fresh,
            };
            let outcome = ctx.crawl(&options).await.context("crawl failed")?;
            let report = CrawlReport::from_outcome(&outcome);
            if json {
                print_json(&report)?;
            } else {
                print_crawl_report(&report);
            }
        }

        Command::Download => {
            let report = ctx.download().await.context("download failed")?;
            if json {
                print_json(&report)?;
            } else {
                print_download_report(&report);
            }
        }

        Command::Scrape {
            seed,
            max_iterations,
        } => {
            let options = CrawlOptions {
                seed_url: seed,
                max_iterations,
                fresh: false,
            };
            let (outcome, report) = ctx.scrape(&options).await.context("scrape failed")?;
            let crawl = CrawlReport::from_outcome(&outcome);
            if json {
                print_json(&json!({ "crawl": crawl, "download": report }))?;
            } else {
                print_crawl_report(&crawl);
                println!();
                print_download_report(&report);
            }
        }

        Command::Unpack { zip, dest } => {
            let dest = dest.unwrap_or_else(|| ctx.destination_dir());
            let files = ctx
                .unpack(&zip, &dest)
                .with_context(|| format!("failed to unpack {}", zip.display()))?;
            if json {
                print_json(&files)?;
            } else {
                print_manifest(&files);
            }
        }

        Command::Ingest { dir, method, index } => {
            let dir = dir.unwrap_or_else(|| ctx.destination_dir());
            let index = index.unwrap_or(default_index);
            let summary = ctx
                .ingest(&dir, method, &index)
                .await
                .with_context(|| format!("failed to ingest {}", dir.display()))?;
            if json {
                print_json(&summary)?;
            } else {
                print_ingest_summary(&summary);
            }
            if !summary.index.success {
                bail!(
                    "indexing failed: {}",
                    summary.index.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Command::CreateIndex { index } => {
            let index = index.unwrap_or(default_index);
            let created = ctx.create_index(&index).await?;
            if json {
                print_json(&json!({ "success": true, "index": index, "created": created }))?;
            } else if created {
                println!("✓ Created index {}", index);
            } else {
                println!("Index {} already exists", index);
            }
        }

        Command::ListIndices => {
            let indices = ctx.search().list_indices().await?;
            if json {
                print_json(&indices)?;
            } else {
                print_indices(&indices);
            }
        }

        Command::DeleteIndex { index } => {
            let deleted = ctx.search().delete_index(&index).await?;
            if json {
                print_json(&json!({ "success": deleted, "index": index }))?;
            } else if deleted {
                println!("✓ Deleted index {}", index);
            } else {
                println!("Index {} not found", index);
            }
        }

        Command::Search {
            text,
            field,
            size,
            index,
        } => {
            let index = index.unwrap_or(default_index);
            let query = SearchQuery::new(text).with_field(field).with_size(size);
            let result = run_search(ctx.search(), &index, &query).await?;
            if json {
                print_json(&result)?;
            } else {
                print_search_result(&result);
            }
        }

        Command::Get { id, index } => {
            let index = index.unwrap_or(default_index);
            match ctx.search().get(&index, &id).await? {
                Some(doc) => print_json(&doc)?,
                None => bail!("document {} not found in {}", id, index),
            }
        }

        Command::Put { id, file, index } => {
            let index = index.unwrap_or(default_index);
            let doc = read_json_object(&file)?;
            ctx.search().put(&index, &id, &doc).await?;
            if json {
                print_json(&json!({ "success": true, "id": id }))?;
            } else {
                println!("✓ Stored {} in {}", id, index);
            }
        }

        Command::Update { id, file, index } => {
            let index = index.unwrap_or(default_index);
            let partial = read_json_object(&file)?;
            let updated = ctx.search().update(&index, &id, &partial).await?;
            if json {
                print_json(&json!({ "success": updated, "id": id }))?;
            } else if updated {
                println!("✓ Updated {} in {}", id, index);
            } else {
                bail!("document {} not found in {}", id, index);
            }
        }

        Command::Delete { id, index } => {
            let index = index.unwrap_or(default_index);
            let deleted = ctx.search().delete(&index, &id).await?;
            if json {
                print_json(&json!({ "success": deleted, "id": id }))?;
            } else if deleted {
                println!("✓ Deleted {} from {}", id, index);
            } else {
                println!("Document {} not found in {}", id, index);
            }
        }

        Command::Check => {
            ctx.search()
                .ping()
                .await
                .context("search engine check failed")?;
            if json {
                print_json(&json!({ "success": true }))?;
            } else {
                println!("✓ Connected to {}", ctx.config().search.url);
            }
        }

        Command::ShowConfig => handle_show_config(ctx.config(), json)?,
    }

    Ok(())
}

fn read_json_object(file: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    if !doc.is_object() {
        bail!("{} must contain a JSON object", file.display());
    }
    Ok(doc)
}
