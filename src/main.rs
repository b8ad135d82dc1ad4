use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fuzzfind::deps::{Locator, ToolRole};
use fuzzfind::handler::QueryHandler;
use fuzzfind::output::{Action, print};
use fuzzfind::prefs::{self, RawPreferences, SearchMode, keys};
use fuzzfind::utils::{PreferenceStore, containing_dir, open};
use fuzzfind::{logging, server};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fuzzfind")]
#[command(about = "Find files and directories by piping fd into fzf")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    #[command(flatten)]
    overrides: PreferenceOverrides,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Per-invocation overrides of the stored preferences
#[derive(Args, Default)]
struct PreferenceOverrides {
    /// Restrict results to files or directories
    #[arg(short = 't', long = "type", value_enum)]
    search_type: Option<TypeArg>,

    /// Include hidden files and directories
    #[arg(short = 'H', long)]
    hidden: bool,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<String>,

    /// Directory to search from (`~` is expanded)
    #[arg(short, long)]
    base_dir: Option<String>,

    /// Ignore file passed to fd
    #[arg(long)]
    ignore_file: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Both,
    Files,
    Dirs,
}

impl From<TypeArg> for SearchMode {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Both => SearchMode::Both,
            TypeArg::Files => SearchMode::FilesOnly,
            TypeArg::Dirs => SearchMode::DirsOnly,
        }
    }
}

impl PreferenceOverrides {
    fn to_raw(&self) -> RawPreferences {
        let mut raw = RawPreferences::new();
        if let Some(search_type) = self.search_type {
            raw.set(keys::SEARCH_TYPE, SearchMode::from(search_type).ordinal().to_string());
        }
        if self.hidden {
            raw.set(keys::ALLOW_HIDDEN, "1");
        }
        if let Some(limit) = &self.limit {
            raw.set(keys::RESULT_LIMIT, limit.as_str());
        }
        if let Some(base_dir) = &self.base_dir {
            raw.set(keys::BASE_DIR, base_dir.as_str());
        }
        if let Some(ignore_file) = &self.ignore_file {
            raw.set(keys::IGNORE_FILE, ignore_file.as_str());
        }
        raw
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search once and print the results
    Search {
        /// Search query
        query: Vec<String>,

        #[command(flatten)]
        overrides: PreferenceOverrides,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive search-as-you-type mode
    #[cfg(feature = "interactive")]
    Interactive {
        /// Initial query
        query: Option<String>,

        #[command(flatten)]
        overrides: PreferenceOverrides,
    },
    /// Answer newline-delimited JSON queries from a host on stdin/stdout
    Serve,
    /// Check that fd and fzf are installed and the preferences are valid
    Doctor,
    /// Manage stored preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Open a path with the desktop's default handler
    Open {
        path: PathBuf,

        /// Open the directory containing the path instead
        #[arg(long)]
        containing_dir: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective preferences
    Show,
    /// Print the preferences file location
    Path,
    /// Set one preference (search_type, allow_hidden, result_limit, base_dir, ignore_file)
    Set { key: String, value: String },
    /// Remove stored preferences, restoring defaults
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let color = !cli.no_color;

    match cli.command {
        Some(Commands::Search {
            query,
            overrides,
            json,
        }) => {
            search_once(&query.join(" "), &overrides, json || cli.json, color)?;
        }
        #[cfg(feature = "interactive")]
        Some(Commands::Interactive { query, overrides }) => {
            fuzzfind::tui::run(QueryHandler::new(), load_preferences(&overrides)?, query)?;
        }
        Some(Commands::Serve) => {
            let handler = QueryHandler::new();
            let stdin = io::stdin();
            let stdout = io::stdout();
            server::serve(&handler, &mut stdin.lock(), &mut stdout.lock())?;
        }
        Some(Commands::Doctor) => {
            doctor(&cli.overrides)?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action)?;
        }
        Some(Commands::Open {
            path,
            containing_dir: parent,
        }) => {
            let target = if parent { containing_dir(&path) } else { path };
            open::perform(&Action::OpenPath { path: target })?;
        }
        None => {
            if cli.query.is_empty() && !cli.json && interactive_available() {
                run_interactive(&cli.overrides)?;
            } else {
                search_once(&cli.query.join(" "), &cli.overrides, cli.json, color)?;
            }
        }
    }

    Ok(())
}

/// Stored preferences with this invocation's overrides applied
fn load_preferences(overrides: &PreferenceOverrides) -> Result<RawPreferences> {
    let store = PreferenceStore::open_default()?;
    Ok(store.load()?.merged(&overrides.to_raw()))
}

fn search_once(
    query: &str,
    overrides: &PreferenceOverrides,
    json: bool,
    color: bool,
) -> Result<()> {
    let preferences = load_preferences(overrides)?;
    let items = QueryHandler::new().handle(query, &preferences);

    if json {
        print::print_json(&items)?;
    } else {
        print::print_items(&items, color)?;
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn interactive_available() -> bool {
    use std::io::IsTerminal;
    io::stdout().is_terminal()
}

#[cfg(not(feature = "interactive"))]
fn interactive_available() -> bool {
    false
}

#[cfg(feature = "interactive")]
fn run_interactive(overrides: &PreferenceOverrides) -> Result<()> {
    fuzzfind::tui::run(QueryHandler::new(), load_preferences(overrides)?, None)
}

#[cfg(not(feature = "interactive"))]
fn run_interactive(_overrides: &PreferenceOverrides) -> Result<()> {
    Ok(())
}

fn doctor(overrides: &PreferenceOverrides) -> Result<()> {
    let (binding, dependency_errors) = Locator::system().locate();

    println!("Dependencies:");
    for role in [ToolRole::Walker, ToolRole::Filter] {
        match binding.get(role) {
            Some(name) => println!("  {role}: {name}"),
            None => println!("  {role}: missing ({})", role.missing_message()),
        }
    }

    let preferences = load_preferences(overrides)?;
    println!("Preferences:");
    let resolved = prefs::resolve(&preferences);
    match &resolved {
        Ok(config) => {
            println!("  base_dir: {}", config.base_dir.display());
            println!("  search_type: {:?}", config.mode);
            println!("  allow_hidden: {}", config.allow_hidden);
            println!("  result_limit: {}", config.result_limit);
            match &config.ignore_file {
                Some(path) => println!("  ignore_file: {}", path.display()),
                None => println!("  ignore_file: (none)"),
            }
        }
        Err(errors) => {
            for message in errors.messages() {
                println!("  error: {message}");
            }
        }
    }

    if dependency_errors.is_empty() && resolved.is_ok() {
        println!("Ready");
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    let store = PreferenceStore::open_default()?;

    match action {
        ConfigAction::Show => {
            let prefs = store.load()?;
            let json =
                serde_json::to_string_pretty(&prefs).context("Failed to serialize preferences")?;
            println!("{json}");
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
        ConfigAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("Set {key} = {value:?}");

            let errors = prefs::validate(&store.load()?);
            for message in errors {
                println!("warning: {message}");
            }
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("Preferences reset to defaults");
        }
    }

    Ok(())
}
