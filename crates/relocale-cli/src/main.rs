use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use relocale_config::RelocaleConfig;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod prompt;
mod ui;

#[derive(Parser)]
#[command(
    name = "relocale",
    version,
    about = "Reconfigure the locale set of a multi-locale static site"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors and requested data
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log debug events to the console
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Change the default locale and the locale list, then update config
    /// files and locale folders to match
    Configure {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// New default locale (skips the questions)
        #[arg(long = "default", value_name = "LOCALE")]
        default_locale: Option<String>,
        /// Additional locales, comma-separated
        #[arg(long, value_delimiter = ',', value_name = "LOCALES", requires = "default_locale")]
        locales: Option<Vec<String>>,
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the current default locale and locale list
    Status {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Dump JSON schemas of the machine-readable reports
    Schema {
        #[arg(long, default_value = "./docs/assets/schemas")]
        out_dir: PathBuf,
    },
}

impl Commands {
    fn root(&self) -> &Path {
        match self {
            Commands::Configure { root, .. } | Commands::Status { root, .. } => root,
            Commands::Schema { .. } => Path::new("."),
        }
    }
}

/// Settings shared by every command.
pub struct Ctx {
    pub use_color: bool,
    pub cfg: RelocaleConfig,
}

trait Runnable {
    fn run(self, ctx: &Ctx) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, ctx: &Ctx) -> Result<()> {
        let cmd_name = format!("{:?}", self);
        info!(event = "command_start", cmd = %cmd_name);

        let result = match self {
            Commands::Configure {
                root,
                default_locale,
                locales,
                yes,
                dry_run,
                format,
            } => commands::configure::run_configure(
                ctx,
                commands::configure::ConfigureArgs {
                    root,
                    default_locale,
                    locales,
                    yes,
                    dry_run,
                    format,
                },
            ),
            Commands::Status { root, format } => commands::status::run_status(ctx, root, format),
            Commands::Schema { out_dir } => commands::schema::run_schema(out_dir),
        };

        match &result {
            Ok(_) => info!(event = "command_finished", cmd = %cmd_name),
            Err(e) => error!(event = "command_failed", cmd = %cmd_name, error = ?e),
        }

        result
    }
}

/// Console events go to stderr (`RUST_LOG` overrides the level); a daily
/// rolling file gets everything at debug when a log directory is set.
fn init_tracing(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        );

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, "relocale.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(file_writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    ui::set_quiet(cli.quiet);

    let cfg = relocale_config::load_config(cli.cmd.root())?;
    let log_dir = std::env::var_os("RELOCALE_LOG_DIR")
        .map(PathBuf::from)
        .or_else(|| cfg.log_dir.as_ref().map(|d| cli.cmd.root().join(d)));
    let _guard = init_tracing(log_dir.as_deref(), cli.verbose);
    debug!(event = "config_loaded", log_dir = ?log_dir);

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    let ctx = Ctx { use_color, cfg };
    cli.cmd.run(&ctx)
}
