//! Command-line interface parsing and handling
//!
//! This module parses arguments, sets up diagnostics and wires the shared
//! pieces (config, API client, command services) for each subcommand.

pub mod model_list;
pub mod say;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::MistralClient;
use crate::auth::{delete_api_key, prompt_api_key, resolve_api_key, store_api_key};
use crate::cli::model_list::list_models;
use crate::cli::say::run_say;
use crate::commands::CommandInterceptor;
use crate::core::app::AppOptions;
use crate::core::config::Config;
use crate::core::model::ModelDescriptor;
use crate::services::Services;
use crate::ui::chat_loop::{run_chat, ChatSetup};
use crate::ui::theme::Theme;
use crate::utils::logging::TranscriptLog;

/// Upper bound on how long exit waits for tasks that ignored cancellation.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "desktop4mistral")]
#[command(about = "A terminal chat client for Mistral models")]
#[command(
    long_about = "desktop4mistral is a full-screen terminal chat client for the Mistral API. \
Messages starting with a slash are handled locally before anything is sent to the model.\n\n\
Authentication:\n\
  Use 'desktop4mistral auth' to store your API key in the system keyring.\n\
  MISTRAL_API_KEY takes precedence when set.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Esc               Cancel the pending request / close the model picker\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+O            Choose a model\n\
  PageUp/PageDown   Scroll the transcript\n\
  Ctrl+C            Quit\n\n\
Commands:\n\
  /help                         List commands\n\
  /read <path-or-url>           Load a file or web page into the chat\n\
  /wiki_id <page-id-or-title>   Load a Wikipedia page\n\
  /wiki_search <query>          Search Wikipedia\n\
  /git <path-or-url>            Load a git repository"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to activate instead of the configured default
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Read configuration from this file instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append the conversation to this file
    #[arg(short = 'l', long, global = true, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Write diagnostics to this file while the chat interface is running
    #[arg(long, global = true, value_name = "PATH")]
    pub debug_log: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply; slash commands work here too
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List the models available to your API key
    Models,
    /// Store your API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async_main(args));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.as_ref().unwrap_or(&Commands::Chat);
    init_tracing(&args, matches!(command, Commands::Chat))?;

    match command {
        Commands::Auth => {
            let key = prompt_api_key(&mut std::io::stdin().lock())?;
            store_api_key(&key)?;
            println!("✅ API key stored in the system keyring");
            Ok(())
        }
        Commands::Deauth => {
            if delete_api_key()? {
                println!("✅ API key removed");
            } else {
                println!("No stored API key to remove");
            }
            Ok(())
        }
        Commands::Models => {
            let config = load_config(&args)?;
            let (client, _) = connect(&config, &args).await?;
            client.refresh_models().await?;
            list_models(client.as_ref());
            Ok(())
        }
        Commands::Say { prompt } => {
            let config = load_config(&args)?;
            let (client, interceptor) = connect_with_fallback(&config, &args).await?;
            run_say(prompt, client, interceptor, app_options(&config, &args)?).await
        }
        Commands::Chat => {
            let config = load_config(&args)?;
            let (client, interceptor) = connect_with_fallback(&config, &args).await?;
            let setup = ChatSetup {
                client,
                interceptor,
                options: app_options(&config, &args)?,
                theme: Theme::from_config(&config.theme),
            };
            run_chat(setup).await
        }
    }
}

/// The TUI owns the terminal, so interactive sessions only log when given a
/// file. Everything else logs to stderr.
fn init_tracing(args: &Args, interactive: bool) -> Result<(), Box<dyn Error>> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    if let Some(path) = &args.debug_log {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn active_model(config: &Config, args: &Args) -> String {
    args.model
        .clone()
        .unwrap_or_else(|| config.default_model().to_string())
}

fn app_options(config: &Config, args: &Args) -> Result<AppOptions, Box<dyn Error>> {
    let mut options = AppOptions::from_config(config);
    options.default_model = Some(active_model(config, args));
    if let Some(path) = &args.log {
        options.transcript = Some(TranscriptLog::new(path)?);
    }
    Ok(options)
}

async fn connect(
    config: &Config,
    args: &Args,
) -> Result<(Arc<MistralClient>, Arc<CommandInterceptor>), Box<dyn Error>> {
    let (api_key, source) = resolve_api_key()?;
    info!(?source, base_url = config.base_url(), "connecting");

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;
    let client = Arc::new(MistralClient::new(
        http.clone(),
        config.base_url(),
        api_key,
        active_model(config, args),
    ));
    let interceptor = Arc::new(CommandInterceptor::new(Services::from_config(config, http)));
    Ok((client, interceptor))
}

/// Like [`connect`], but a failed model listing leaves the configured model
/// as the only choice instead of aborting.
async fn connect_with_fallback(
    config: &Config,
    args: &Args,
) -> Result<(Arc<MistralClient>, Arc<CommandInterceptor>), Box<dyn Error>> {
    let (client, interceptor) = connect(config, args).await?;
    if let Err(err) = client.refresh_models().await {
        warn!(error = %err, "could not fetch the model list");
        client.replace_models(vec![ModelDescriptor::new(active_model(config, args), "")]);
    }
    Ok((client, interceptor))
}
