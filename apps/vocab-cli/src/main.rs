use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use search_core::{FilterExpression, PageRequest, SearchParams, SortSpec};
use search_db::{DbEngine, PageLimits};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;
use vocabulary::infra::storage::seed::load_demo;
use vocabulary::{Migrator, SeaOrmVocabularyRepository, VocabularyRepository};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Vocabulary search - filter, sort and page the vocabulary database
#[derive(Parser)]
#[command(name = "vocab-cli")]
#[command(about = "Vocabulary search - filter, sort and page the vocabulary database")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config)
    #[arg(long)]
    database: Option<String>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Apply migrations and load the demo data set
    Seed,
    /// Run a search and print the page as JSON
    Search(SearchArgs),
    /// Check configuration
    Check,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Resource {
    Words,
    Translations,
    Languages,
    Users,
}

#[derive(Args, Debug)]
struct SearchArgs {
    resource: Resource,

    /// Filter expression as JSON: {"combinator":"AND","conditions":[{"field":..,"operator":..,"value":..}]}
    #[arg(long)]
    filter: Option<String>,

    /// Signed sort tokens, e.g. "-createdAt,+content"
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,

    /// Zero based page index
    #[arg(long, default_value_t = 0)]
    page: u64,

    /// Page size (defaults to search.default_page_size)
    #[arg(long)]
    size: Option<u64>,

    /// Identity id whose words to list
    #[arg(long)]
    owner: Option<String>,

    /// Drop unknown filter and sort fields instead of failing
    #[arg(long)]
    lenient: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        database_url: cli.database.clone(),
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, config.home_path());

    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::Seed => seed(&config).await,
        Commands::Search(search) => run_search(&config, search).await,
        Commands::Check => check_config(&config),
    }
}

/// Detect DB backend from URL scheme (sqlite/postgres/mysql).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<DbEngine> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    // the DSN itself may carry credentials; keep it out of the message
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN: {}", e))?;

    match url.scheme() {
        "sqlite" => Ok(DbEngine::Sqlite),
        "postgres" | "postgresql" => Ok(DbEngine::Postgres),
        "mysql" => Ok(DbEngine::MySql),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_db(config: &AppConfig) -> Result<DatabaseConnection> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;
    let engine = detect_from_dsn(db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if engine == DbEngine::Sqlite && dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, config.home_path(), true)?;
    }

    tracing::info!(?engine, "connecting to database");
    let db = search_db::connect(&dsn, &db_config.connect_opts()).await?;
    Ok(db)
}

async fn migrate(config: &AppConfig) -> Result<()> {
    let db = connect_db(config).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("migrations applied");
    println!("Migrations applied");
    Ok(())
}

async fn seed(config: &AppConfig) -> Result<()> {
    let db = connect_db(config).await?;
    Migrator::up(&db, None).await?;

    let repo = SeaOrmVocabularyRepository::new(db);
    let existing = repo.find_languages(&SearchParams::new()).await?;
    if existing.total_elements > 0 {
        println!("Demo data already present");
        return Ok(());
    }

    load_demo(repo.conn()).await?;
    tracing::info!("demo data loaded");
    println!("Demo data loaded");
    Ok(())
}

fn build_params(args: &SearchArgs, limits: &PageLimits) -> Result<SearchParams> {
    let filter = match &args.filter {
        Some(raw) => serde_json::from_str::<FilterExpression>(raw)
            .context("Invalid --filter: expected a JSON filter expression")?,
        None => FilterExpression::none(),
    };
    let sort = match &args.sort {
        Some(raw) => raw.parse::<SortSpec>()?,
        None => SortSpec::empty(),
    };
    if args.size == Some(0) {
        return Err(anyhow!("--size must be at least 1"));
    }
    // clamp before the page number becomes an offset
    let page = PageRequest::of_page(args.page, limits.clamp(args.size))?;

    Ok(SearchParams::new()
        .with_filter(filter)
        .with_sort(sort)
        .with_page(page))
}

async fn run_search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    if args.owner.is_some() && args.resource != Resource::Words {
        return Err(anyhow!("--owner only applies to words"));
    }
    let params = build_params(&args, &config.search.limits())?;

    let db = connect_db(config).await?;
    let mut repo = SeaOrmVocabularyRepository::new(db).with_limits(config.search.limits());
    if args.lenient {
        repo = repo.lenient();
    }

    tracing::debug!(resource = ?args.resource, "running search");
    match args.resource {
        Resource::Words => print_json(&repo.find_words(&params, args.owner.as_deref()).await?),
        Resource::Translations => print_json(&repo.find_translations(&params).await?),
        Resource::Languages => print_json(&repo.find_languages(&params).await?),
        Resource::Users => print_json(&repo.find_users(&params).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        detect_from_dsn(db)?;
    }

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
