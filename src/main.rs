use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use scopus_scout::config::{find_config_file, get_config, load_config, Config, ConfigFile};
use scopus_scout::models::{sort_by_citations, Document, SearchQuery, DEFAULT_PAGE_SIZE};
use scopus_scout::print_status;
use scopus_scout::scopus::{fetch_author_documents, ScopusClient};
use scopus_scout::sink::{default_csv_filename, export_csv, DocumentStore};
use scopus_scout::ui::{self, Status};
use scopus_scout::utils::{is_terminal, truncate_with_ellipsis, CacheService};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// scopus-scout - fetch, inspect and archive an author's Scopus publication record
#[derive(Parser, Debug)]
#[command(name = "scopus-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, inspect and archive an author's Scopus publication record", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable the response cache for this command
    #[arg(long, global = true, default_value_t = false)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every publication of an author
    #[command(alias = "f")]
    Fetch {
        /// Scopus author id
        author_id: String,

        /// Entries per search page (max 100)
        #[arg(long, short, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Export the batch to a CSV file at this path
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Export to the default CSV filename for this author
        #[arg(long)]
        export: bool,

        /// Store each record in this SQLite database
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Store records in the default database
        #[arg(long)]
        store: bool,
    },

    /// Show one stored document in detail
    #[command(alias = "s")]
    Show {
        /// Document EID
        eid: String,

        /// Database to read from
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },

    /// Inspect or clear the response cache
    Cache {
        /// Remove all cached entries
        #[arg(long)]
        clear: bool,
    },

    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scopus_scout={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.quiet {
        // Progress reporters check this to stay silent
        std::env::set_var("SCOPUS_SCOUT_QUIET", "1");
    }

    // Load configuration from file if specified or found in default locations
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()
    };

    match cli.command.take() {
        Some(Commands::Fetch {
            author_id,
            page_size,
            csv,
            export,
            db,
            store,
        }) => {
            run_fetch(
                &cli, &config, author_id, page_size, csv, export, db, store,
            )
            .await?;
        }

        Some(Commands::Show { eid, db }) => {
            let path = db.unwrap_or_else(|| config.storage.database_path.clone());
            let document_store = DocumentStore::new(&path);

            match document_store.fetch(&eid).await {
                Ok(Some(doc)) => ui::print_document_panel(&doc),
                Ok(None) => {
                    print_status!(
                        Status::Warning,
                        format!("No stored document with EID {} in {}", eid, path.display())
                    );
                }
                Err(e) => anyhow::bail!("could not read document: {}", e),
            }
        }

        Some(Commands::Cache { clear }) => {
            let cache = CacheService::from_config(config.cache.clone());
            cache.initialize()?;

            if clear {
                cache.clear_all()?;
                print_status!(Status::Success, "Cache cleared");
            } else {
                let stats = cache.stats();
                if !stats.enabled {
                    print_status!(Status::Info, "Cache is disabled");
                } else {
                    println!("Cache directory: {}", stats.cache_dir.display());
                    println!("  Cached searches:  {}", stats.search_count);
                    println!("  Cached abstracts: {}", stats.abstract_count);
                    println!("  Total size:       {} KB", stats.total_size_kb);
                    println!(
                        "  TTL: searches {}s, abstracts {}s",
                        stats.ttl_search.as_secs(),
                        stats.ttl_abstracts.as_secs()
                    );
                }
            }
        }

        Some(Commands::Init { force }) => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from("scopus-scout.toml"));

            if path.exists() && !force {
                print_status!(
                    Status::Warning,
                    format!("{} already exists (use --force to overwrite)", path.display())
                );
            } else {
                ConfigFile::default()
                    .save(&path)
                    .map_err(|e| anyhow::anyhow!(e))?;
                print_status!(
                    Status::Success,
                    format!("Wrote starter configuration to {}", path.display())
                );
            }
        }

        None => {
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  fetch <author-id>   - Fetch an author's publications");
            println!("  show <eid>          - Show one stored document");
            println!("  cache               - Show cache statistics");
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_fetch(
    cli: &Cli,
    config: &Config,
    author_id: String,
    page_size: usize,
    csv: Option<PathBuf>,
    export: bool,
    db: Option<PathBuf>,
    store: bool,
) -> Result<()> {
    // A missing credential is a configuration error; the batch never starts.
    let Some(client) = ScopusClient::from_config(config) else {
        anyhow::bail!(
            "no API key configured; set SCOPUS_API_KEY or add an [api] key entry to the config file"
        );
    };

    let cache = if cli.no_cache {
        None
    } else {
        let service = CacheService::from_config(config.cache.clone());
        if let Err(e) = service.initialize() {
            tracing::warn!("cache unavailable: {}", e);
        }
        Some(service)
    };

    let query = SearchQuery::new(&author_id).page_size(page_size);

    let h_index = client.fetch_h_index(&author_id).await;
    let report = fetch_author_documents(&client, cache.as_ref(), &query).await;

    let mut documents = report.documents;
    sort_by_citations(&mut documents);

    if !cli.quiet {
        print_status!(
            Status::Info,
            format!("Author {}: h-index {}", author_id, h_index)
        );
        if report.complete {
            print_status!(
                Status::Success,
                format!(
                    "Fetched {} of {} documents",
                    documents.len(),
                    report.total_results
                )
            );
        } else {
            print_status!(
                Status::Warning,
                format!(
                    "Partial fetch: {} of {} documents (an error interrupted pagination)",
                    documents.len(),
                    report.total_results
                )
            );
        }
        if report.missing_details > 0 {
            print_status!(
                Status::Warning,
                format!(
                    "{} documents are missing abstract details",
                    report.missing_details
                )
            );
        }
    }

    output_documents(&documents, cli.output);

    if export || csv.is_some() {
        let path = csv.unwrap_or_else(|| {
            config
                .export
                .directory
                .join(default_csv_filename(&author_id))
        });

        match export_csv(&path, &documents) {
            Ok(()) => print_status!(
                Status::Success,
                format!("Exported {} rows to {}", documents.len(), path.display())
            ),
            Err(e) => print_status!(Status::Error, format!("CSV export failed: {}", e)),
        }
    }

    if store || db.is_some() {
        let path = db.unwrap_or_else(|| config.storage.database_path.clone());
        let document_store = DocumentStore::new(&path);

        let mut stored = 0usize;
        for doc in &documents {
            match document_store.upsert(doc).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    // Per-record failure; the upsert is idempotent, so a
                    // re-run can pick this record up again.
                    print_status!(Status::Error, format!("Failed to store {}: {}", doc.eid, e));
                }
            }
        }

        print_status!(
            Status::Success,
            format!("Stored {} documents in {}", stored, path.display())
        );
    }

    Ok(())
}

fn output_documents(documents: &[Document], format: OutputFormat) {
    let actual_format = if format == OutputFormat::Auto {
        if is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(documents).unwrap());
        }
        OutputFormat::Plain => {
            for doc in documents {
                println!("{} - {} ({})", doc.title, doc.journal, doc.pub_date);
                println!("  Citations: {}", doc.citations);
                if doc.doi != scopus_scout::models::PLACEHOLDER {
                    println!("  DOI: {}", doc.doi);
                }
                println!("  EID: {}", doc.eid);
                println!();
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec![
                "Title", "Journal", "Year", "Citations", "Type", "DOI",
            ]);

            for doc in documents {
                let year = doc
                    .pub_year()
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| doc.pub_date.chars().take(4).collect());

                table.add_row(vec![
                    Cell::new(truncate_with_ellipsis(&doc.title, 50)).add_attribute(Attribute::Bold),
                    Cell::new(truncate_with_ellipsis(&doc.journal, 30)),
                    Cell::new(year),
                    Cell::new(doc.citations),
                    Cell::new(&doc.doc_type),
                    Cell::new(truncate_with_ellipsis(&doc.doi, 30)),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["scopus-scout"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(!cli.no_cache);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["scopus-scout", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["scopus-scout", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_output_format() {
        let cli = Cli::parse_from(["scopus-scout", "-o", "json"]);
        assert_eq!(cli.output, OutputFormat::Json);

        let cli = Cli::parse_from(["scopus-scout", "--output", "table"]);
        assert_eq!(cli.output, OutputFormat::Table);
    }

    #[test]
    fn test_cli_fetch_command() {
        let cli = Cli::parse_from(["scopus-scout", "fetch", "9736051900"]);
        match &cli.command {
            Some(Commands::Fetch {
                author_id,
                page_size,
                csv,
                export,
                db,
                store,
            }) => {
                assert_eq!(author_id, "9736051900");
                assert_eq!(*page_size, DEFAULT_PAGE_SIZE);
                assert!(csv.is_none());
                assert!(!export);
                assert!(db.is_none());
                assert!(!store);
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_cli_fetch_with_sinks() {
        let cli = Cli::parse_from([
            "scopus-scout",
            "fetch",
            "123",
            "--page-size",
            "50",
            "--csv",
            "out.csv",
            "--store",
        ]);
        match &cli.command {
            Some(Commands::Fetch {
                page_size,
                csv,
                store,
                ..
            }) => {
                assert_eq!(*page_size, 50);
                assert_eq!(csv.clone(), Some(PathBuf::from("out.csv")));
                assert!(*store);
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_cli_show_command() {
        let cli = Cli::parse_from(["scopus-scout", "show", "2-s2.0-1", "--db", "docs.db"]);
        match &cli.command {
            Some(Commands::Show { eid, db }) => {
                assert_eq!(eid, "2-s2.0-1");
                assert_eq!(db.clone(), Some(PathBuf::from("docs.db")));
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_cache_command() {
        let cli = Cli::parse_from(["scopus-scout", "cache", "--clear"]);
        match &cli.command {
            Some(Commands::Cache { clear }) => assert!(*clear),
            _ => panic!("Expected Cache command"),
        }
    }

    #[test]
    fn test_cli_init_command() {
        let cli = Cli::parse_from(["scopus-scout", "init", "--force"]);
        match &cli.command {
            Some(Commands::Init { force }) => assert!(*force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_no_cache_flag() {
        let cli = Cli::parse_from(["scopus-scout", "--no-cache", "fetch", "123"]);
        assert!(cli.no_cache);
    }
}
