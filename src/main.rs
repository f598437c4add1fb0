//! git-auto-commit - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use git_auto_commit::commit::{
    CommitOptions, ConfirmationMode, Orchestrator, TerminalConfirmation, check_repository,
    error_line,
};
use git_auto_commit::config::{Config, ConfigStore};
use git_auto_commit::error::AutoCommitError;
use git_auto_commit::i18n::{Language, Msg, tr};
use git_auto_commit::llm::{ChatCompletionsClient, CompletionInvoker};

/// Generate a commit message for the pending changes with an LLM and commit them.
#[derive(Parser, Debug)]
#[command(name = "git-auto-commit")]
#[command(about = "Generate a commit message with an LLM and commit the pending changes")]
#[command(version)]
struct Cli {
    /// Commit without asking for confirmation
    #[arg(short = 'y', long)]
    auto_confirm: bool,

    /// Use English for the prompt and console output
    #[arg(long, global = true)]
    en: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the stored API key
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Store the API key
    SetApiKey { value: Option<String> },
    /// Print the stored API key
    GetApiKey,
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_failure(e),
    };

    init_tracing(cli.verbose);

    if let Some(Command::Config { action }) = cli.command.take() {
        return run_config(action, cli.en);
    }
    run_commit(&cli).await
}

/// Help and version exit 0; every other parse failure exits 1.
fn parse_failure(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            let lang = language_from_args();
            let name = e
                .get(clap::error::ContextKind::InvalidSubcommand)
                .map(|v| v.to_string())
                .unwrap_or_default();
            eprintln!("{}", error_line(&AutoCommitError::UnknownSubcommand(name), lang));
            eprintln!("{}", tr(lang, Msg::ConfigUsage));
            ExitCode::FAILURE
        }
        _ => {
            let _ = e.print();
            ExitCode::FAILURE
        }
    }
}

/// `--en` before clap has accepted the command line.
fn language_from_args() -> Language {
    if std::env::args().any(|a| a == "--en") {
        Language::En
    } else {
        Language::default()
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,git_auto_commit=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Language precedence: `--en`, then the config file, then Chinese.
fn resolve_language(en: bool, config: &Config) -> Language {
    if en {
        Language::En
    } else {
        config.language.unwrap_or_default()
    }
}

async fn run_commit(cli: &Cli) -> ExitCode {
    let config = match ConfigStore::user_default().and_then(|store| store.load()) {
        Ok(config) => config,
        Err(e) => {
            let lang = resolve_language(cli.en, &Config::default());
            eprintln!("{}", error_line(&AutoCommitError::Config(e), lang));
            return ExitCode::FAILURE;
        }
    };
    let language = resolve_language(cli.en, &config);

    let client = match ChatCompletionsClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            // Repository problems are reported ahead of a missing key.
            let err = check_repository(&cli.path).err().unwrap_or(e);
            eprintln!("{}", error_line(&err, language));
            return ExitCode::FAILURE;
        }
    };
    debug!("Using endpoint {} with model {}", client.endpoint(), config.model());

    let invoker = CompletionInvoker::new(client).with_model(config.model());
    let mode = if cli.auto_confirm {
        ConfirmationMode::AutoConfirm
    } else {
        ConfirmationMode::Interactive
    };

    let mut orchestrator = Orchestrator::new(
        cli.path.clone(),
        invoker,
        CommitOptions { language },
        mode,
        TerminalConfirmation,
    );
    let result = orchestrator.run().await;
    ExitCode::from(result.exit_code)
}

fn run_config(action: Option<ConfigAction>, en: bool) -> ExitCode {
    let store = match ConfigStore::user_default() {
        Ok(store) => store,
        Err(e) => {
            let lang = resolve_language(en, &Config::default());
            eprintln!("{}", error_line(&AutoCommitError::Config(e), lang));
            return ExitCode::FAILURE;
        }
    };
    // An unreadable config file still lets the user overwrite the key.
    let lang = resolve_language(en, &store.load().unwrap_or_default());

    match config_action(&store, action, lang) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}{}", tr(lang, Msg::ErrorPrefix), e);
            ExitCode::FAILURE
        }
    }
}

fn config_action(store: &ConfigStore, action: Option<ConfigAction>, lang: Language) -> Result<ExitCode> {
    match action {
        None => {
            println!("{}", tr(lang, Msg::ConfigUsage));
            Ok(ExitCode::SUCCESS)
        }
        Some(ConfigAction::SetApiKey { value }) => {
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                eprintln!("{}{}", tr(lang, Msg::ErrorPrefix), tr(lang, Msg::MissingApiKeyValue));
                return Ok(ExitCode::FAILURE);
            };
            store.set_api_key(&value)?;
            println!("{}", tr(lang, Msg::ApiKeySet));
            Ok(ExitCode::SUCCESS)
        }
        Some(ConfigAction::GetApiKey) => {
            match store.get_api_key()? {
                Some(key) => println!("{}{}", tr(lang, Msg::CurrentApiKey), key),
                None => println!("{}", tr(lang, Msg::ApiKeyUnset)),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
