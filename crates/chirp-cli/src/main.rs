use anyhow::Result;
use chirp_cli::OutputFormat;
use chirp_cli::commands;
use chirp_cli::options::{BrowserArgs, ReplyArgs, SearchArgs, resolve_data_dir};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chirp")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Reply automatically to posts that mention a handle",
    long_about = "chirp signs in with a headless Chrome, searches for recent posts mentioning \
                  a handle, stores them as a snapshot, and replies once to every post it has \
                  not replied to before."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the session, replied posts and snapshots [default: ~/.chirp]
    #[arg(long, global = true, env = "CHIRP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape new mentions and reply to each one not replied to yet
    Run {
        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        reply: ReplyArgs,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Scrape mentions and store a snapshot without replying
    Scrape {
        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Reply to the pending posts of the latest snapshot
    Reply {
        #[command(flatten)]
        reply: ReplyArgs,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Log in and store the session
    Login {
        /// Log in again even if a session is stored
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Show the stored session, replied posts and snapshots
    Status,

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts

SUPPORTED SHELLS:
  bash, zsh, fish, powershell, elvish

INSTALLATION:
  bash:  chirp completion --shell bash >> ~/.bashrc
  zsh:   chirp completion --shell zsh > \"${fpath[1]}/_chirp\"
  fish:  chirp completion --shell fish > ~/.config/fish/completions/chirp.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(short, long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(cli.verbose);

    let data_dir = cli.data_dir.as_deref();
    match &cli.command {
        Commands::Run {
            search,
            reply,
            browser,
        } => commands::run::execute(data_dir, search, reply, browser, cli.format),
        Commands::Scrape { search, browser } => {
            commands::scrape::execute(data_dir, search, browser, cli.format)
        }
        Commands::Reply { reply, browser } => {
            commands::reply::execute(data_dir, reply, browser, cli.format)
        }
        Commands::Login { force, browser } => {
            commands::login::execute(data_dir, *force, browser, cli.format)
        }
        Commands::Status => commands::status::execute(&resolve_data_dir(data_dir)?, cli.format),
        Commands::Completion { shell } => {
            commands::completion::execute(*shell, &mut Cli::command(), &mut std::io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("chirp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chirp=info"))
    };

    // Logs go to stderr so --format json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
