use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use taxa::output::{self, PictureMap};
use taxa::query::{DisplayFormat, ModifierRegistry, SearchExecutor};
use taxa::store::MemoryStore;
use taxa::utils::{self, AppConfig};
use termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taxa")]
#[command(about = "Declarative species search over a catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,

    /// Species catalog (JSON); defaults to the configured catalog
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Config file; defaults to config.json in the app data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported modifiers and their aliases
    Modifiers,
    /// Show the active configuration
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    init_tracing(&config.log_level);

    match &cli.command {
        Some(Commands::Modifiers) => print_modifiers()?,
        Some(Commands::Config) => print_config(&cli, &config)?,
        None => run_search(&cli, &config).await?,
    }

    Ok(())
}

/// Log to stderr; RUST_LOG overrides the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded; ignore
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run_search(cli: &Cli, config: &AppConfig) -> Result<()> {
    let catalog = config
        .effective_catalog(cli.catalog.as_deref())
        .context("No catalog given. Pass --catalog or set \"catalog\" in the config file")?;

    let store = MemoryStore::open(&catalog)
        .await
        .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;

    let registry = ModifierRegistry::with_builtins();
    let executor =
        SearchExecutor::new(&store, &store, &registry).with_seed(config.random_seed);

    let query = cli.query.join(" ");
    debug!("query: {:?}", query);
    let results = executor.execute(&query).await?;

    let pictures = if results.display_format() == DisplayFormat::Gallery {
        output::collect_pictures(&store, &results).await?
    } else {
        PictureMap::default()
    };

    if cli.json {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        output::print_json(&mut lock, &results, &pictures)?;
        return Ok(());
    }

    let mut stdout = StandardStream::stdout(color_choice(cli.color, config.color));
    output::print_results(&mut stdout, &results, &pictures, config.max_display)?;
    Ok(())
}

fn color_choice(mode: ColorMode, configured: bool) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if configured && io::stdout().is_terminal() => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}

fn print_modifiers() -> Result<()> {
    let registry = ModifierRegistry::with_builtins();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "Modifiers are written name:value; prefix the name with '-' to invert.")?;
    writeln!(out, "Comma-separated values match if any value matches.")?;
    writeln!(out)?;

    for entry in registry.entries() {
        writeln!(
            out,
            "  {:<36} {:<7} {}",
            entry.aliases.join(", "),
            entry.kind.family(),
            entry.summary
        )?;
    }
    Ok(())
}

fn print_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => utils::get_config_path()?,
    };
    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
