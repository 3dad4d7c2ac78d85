use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use nobox_store::{Catalog, Driver, JsonDriver, KeyCasing, SetMode, StoreConfig, YamlDriver};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod format;
mod import;
mod input;
mod paths;

use error::CliError;
use format::OutputFormat;

/// nobox: JSON and YAML key-value storage from the command line.
///
/// Records live in `<data dir>/nobox/<format>/<db>/<collection>.<ext>`.
/// Invoked as `yamlbox` or `yb`, the default format is YAML.
#[derive(Parser)]
#[command(name = "nobox", version, about, long_about = None)]
struct Cli {
    /// Storage format (defaults to json, or yaml for yamlbox/yb).
    #[arg(short, long, global = true, env = "NOBOX_FORMAT", value_enum)]
    format: Option<Format>,

    /// Override the nobox root directory.
    #[arg(long, global = true, env = "NOBOX_HOME")]
    root: Option<PathBuf>,

    /// Key comparison policy: preserve or lowercase.
    #[arg(long, global = true, env = "NOBOX_KEY_CASING", default_value = "preserve")]
    key_casing: KeyCasing,

    /// Behaviour of `set` on an existing record: merge or replace.
    #[arg(long, global = true, env = "NOBOX_SET_MODE", default_value = "merge")]
    set_mode: SetMode,

    /// Do not take the advisory database lock on writes.
    #[arg(long, global = true, env = "NOBOX_NO_LOCK")]
    no_lock: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// List all databases of the current format.
    Databases,

    /// List the collections in a database.
    Collections {
        /// Database name.
        db: String,
    },

    /// Create or update a record.
    Set {
        db: String,
        collection: String,
        key: String,

        /// Fields as `field:value`. The value may itself contain colons.
        #[arg(required = true, allow_hyphen_values = true)]
        fields: Vec<String>,
    },

    /// Show a single record.
    Get {
        db: String,
        collection: String,
        key: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Delete a record.
    Del {
        db: String,
        collection: String,
        key: String,
    },

    /// List the keys of a collection.
    Keys { db: String, collection: String },

    /// Show every record in a collection.
    All {
        db: String,
        collection: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Count the records in a collection.
    Count { db: String, collection: String },

    /// Delete a collection, or a whole database when no collection is given.
    Drop {
        db: String,
        collection: Option<String>,
    },

    /// Import records from stdin.
    ///
    /// Each line is `key field:value ...` or a JSON object with a `_key`
    /// field. Blank lines and `#` comments are ignored.
    Import {
        db: String,
        collection: String,

        /// Read stdin as one JSON object mapping keys to records.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = match cli.root.clone() {
        Some(root) => root,
        None => paths::resolve_app_data_dir(paths::APP_NAME).ok_or(CliError::NoDataDir)?,
    };
    let config = StoreConfig::builder(root)
        .key_casing(cli.key_casing)
        .set_mode(cli.set_mode)
        .locking(!cli.no_lock)
        .build();

    let format = cli.format.unwrap_or_else(default_format);
    tracing::debug!(?format, root = %config.root().display(), "resolved configuration");

    match format {
        Format::Json => dispatch(&Catalog::new(JsonDriver, config), cli.command),
        Format::Yaml => dispatch(&Catalog::new(YamlDriver, config), cli.command),
    }
}

fn dispatch<D: Driver + Clone>(catalog: &Catalog<D>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Databases => commands::databases(catalog),
        Commands::Collections { db } => commands::collections(catalog, &db),
        Commands::Set {
            db,
            collection,
            key,
            fields,
        } => commands::set(catalog, &db, &collection, &key, &fields),
        Commands::Get {
            db,
            collection,
            key,
            output,
        } => commands::get(catalog, &db, &collection, &key, output),
        Commands::Del {
            db,
            collection,
            key,
        } => commands::del(catalog, &db, &collection, &key),
        Commands::Keys { db, collection } => commands::keys(catalog, &db, &collection),
        Commands::All {
            db,
            collection,
            output,
        } => commands::all(catalog, &db, &collection, output),
        Commands::Count { db, collection } => commands::count(catalog, &db, &collection),
        Commands::Drop { db, collection } => commands::drop(catalog, &db, collection.as_deref()),
        Commands::Import {
            db,
            collection,
            json,
        } => commands::import(catalog, &db, &collection, json, std::io::stdin().lock()),
    }
}

/// `yamlbox` and `yb` default to YAML; anything else to JSON.
fn default_format() -> Format {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_stem())
        .and_then(|stem| stem.to_str())
        .map_or(Format::Json, format_for_program)
}

fn format_for_program(program: &str) -> Format {
    match program {
        "yamlbox" | "yb" => Format::Yaml,
        _ => Format::Json,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nobox_store={level},nobox={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
