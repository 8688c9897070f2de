//! passrunner - query and retrieve secrets from a password store
//!
//! A terminal host for the runner: lists matching entries, copies secrets to
//! the clipboard with auto-clear, and manages extraction actions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use passrunner_core::{
    ActionDefinition, ActionRegistry, Entry, Match, Notifier, PassRunner, RetrievalOutcome,
    RunnerConfig, Settings, copied_message,
};

#[derive(Parser)]
#[command(name = "passrunner")]
#[command(about = "Search a password store and copy secrets to the clipboard")]
#[command(version)]
#[command(after_help = r#"EXAMPLES:
    passrunner query wor                 # Entries containing "wor"
    passrunner query pass                # Every entry
    passrunner show email/work           # Copy the password, clear after the timeout
    passrunner show bank --action user   # Copy the value extracted by the "user" action
    passrunner watch                     # Keep the index live, read queries from stdin

ENVIRONMENT:
    PASSWORD_STORE_DIR              Store location (default ~/.password-store)
    PASSWORD_STORE_CLIP_TIME        Seconds before the clipboard is cleared (default 45)
    PASSWORD_STORE_OTP_IDENTIFIER   Path prefix marking OTP entries (default totp::)
    RUST_LOG                        Log filter (default info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default <config dir>/passrunner/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries matching a query
    Query {
        /// Query text; `pass` alone lists everything
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },

    /// Copy a secret to the clipboard, or display it with the show-contents action
    Show {
        /// Entry identifier, e.g. email/work
        entry: String,

        /// Action to apply instead of copying the first line
        #[arg(short, long)]
        action: Option<String>,
    },

    /// List or edit the configured actions
    Actions {
        #[command(subcommand)]
        command: Option<ActionsCommand>,
    },

    /// Keep the index live and answer queries read from stdin
    Watch,

    /// Show index statistics
    Stats,
}

#[derive(Subcommand)]
enum ActionsCommand {
    /// List offered actions
    List,

    /// Add an extraction action
    Add {
        /// Action name
        name: String,

        /// Pattern whose first capture group is copied
        regex: String,

        /// Theme icon name
        #[arg(long, default_value = "")]
        icon: String,
    },

    /// Remove an extraction action
    Remove {
        /// Action name
        name: String,
    },

    /// Enable or disable the configured actions
    Enable {
        /// Whether to offer the configured actions
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,

        /// Also offer the show-contents action
        #[arg(long)]
        show_contents: Option<bool>,
    },
}

/// Prints notifications on stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn copied(&self, entry: &Entry, action: Option<&str>, timeout_secs: u64) {
        println!("{}", copied_message(entry, action, timeout_secs));
    }

    fn show_contents(&self, _entry: &Entry, contents: &str) {
        print!("{contents}");
        if !contents.ends_with('\n') {
            println!();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings_path = match cli.config.clone() {
        Some(path) => path,
        None => Settings::default_path().context("no configuration directory available")?,
    };

    match cli.command {
        Commands::Query { text } => {
            let runner = headless_runner(&settings_path)?;
            runner.refresh().await?;
            let matches = runner.matches(&text.join(" ")).await;
            print_matches(&matches, cli.json)?;
        }

        Commands::Show { entry, action } => {
            let runner = clipboard_runner(&settings_path)?;
            show(&runner, Entry::new(entry), action.as_deref()).await?;
        }

        Commands::Actions { command } => {
            actions(&settings_path, command.unwrap_or(ActionsCommand::List), cli.json)?;
        }

        Commands::Watch => {
            let runner = headless_runner(&settings_path)?;
            watch(&runner, cli.json).await?;
        }

        Commands::Stats => {
            let runner = headless_runner(&settings_path)?;
            runner.refresh().await?;
            let stats = runner.stats().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Store:   {}", stats.base_dir.display());
                println!("Entries: {} ({} OTP)", stats.total_entries, stats.otp_entries);
                println!("Indexed: {}", stats.built_at);
            }
        }
    }

    Ok(())
}

fn load_config(settings_path: &Path) -> Result<RunnerConfig> {
    let config = RunnerConfig::load(Some(settings_path))?;
    debug!("Using store at {}", config.base_dir.display());
    Ok(config)
}

/// Runner for commands that never touch the clipboard.
fn headless_runner(settings_path: &Path) -> Result<PassRunner> {
    Ok(PassRunner::headless(
        load_config(settings_path)?,
        Arc::new(StdoutNotifier),
    ))
}

fn clipboard_runner(settings_path: &Path) -> Result<PassRunner> {
    PassRunner::with_system(load_config(settings_path)?, Arc::new(StdoutNotifier))
        .context("failed to access the clipboard")
}

fn print_matches(matches: &[Match], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }
    for m in matches {
        println!("{:?}\t{}", m.relevance, m.entry);
    }
    Ok(())
}

async fn show(runner: &PassRunner, entry: Entry, action: Option<&str>) -> Result<()> {
    let outcome = runner.run(entry, action).await?.await?;

    match outcome {
        RetrievalOutcome::Copied { .. } => {}
        RetrievalOutcome::Displayed { .. } => return Ok(()),
        RetrievalOutcome::Empty => bail!("decrypted entry has no password line"),
        RetrievalOutcome::ExtractionFailed(diagnostic) => bail!(diagnostic),
        RetrievalOutcome::ToolFailed { code } => {
            bail!("decryption tool exited with {code:?}")
        }
        RetrievalOutcome::SpawnFailed(reason) | RetrievalOutcome::ClipboardFailed(reason) => {
            bail!(reason)
        }
    }

    // The clipboard is only held while this process runs.
    let clipboard = runner.clipboard();
    tokio::select! {
        () = clipboard.settle() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for Ctrl-C: {e}");
            }
            clipboard.clear_now().await?;
        }
    }
    Ok(())
}

fn actions(settings_path: &Path, command: ActionsCommand, json: bool) -> Result<()> {
    let mut settings = Settings::load(settings_path)?;

    match command {
        ActionsCommand::List => {
            let registry = ActionRegistry::build(&settings.action_settings());
            let actions = registry.as_slice();
            if json {
                println!("{}", serde_json::to_string_pretty(&actions)?);
            } else {
                for action in actions {
                    println!("{}\t{}\t{:?}", action.name, action.icon, action.rule);
                }
            }
            return Ok(());
        }

        ActionsCommand::Add { name, regex, icon } => {
            if !settings.add_action(ActionDefinition::new(name.clone(), icon, regex)) {
                bail!("an action named {name:?} already exists");
            }
            settings.show_additional_actions = true;
        }

        ActionsCommand::Remove { name } => {
            if !settings.remove_action(&name) {
                bail!("no action named {name:?}");
            }
        }

        ActionsCommand::Enable {
            enabled,
            show_contents,
        } => {
            settings.show_additional_actions = enabled;
            if let Some(show_contents) = show_contents {
                settings.show_full_file_content_action = show_contents;
            }
        }
    }

    settings.save(settings_path)?;
    Ok(())
}

async fn watch(runner: &PassRunner, json: bool) -> Result<()> {
    runner.start().await?;
    eprintln!("Watching {}; enter a query per line", runner.stats().await.base_dir.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let matches = runner.matches(&line).await;
                print_matches(&matches, json)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    runner.shutdown().await;
    Ok(())
}
