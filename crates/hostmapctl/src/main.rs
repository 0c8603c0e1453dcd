// # hostmapctl - hostmap front end
//
// This binary is a THIN integration layer. Registry rules, document
// format and store behaviour all live in hostmap-core and the store crates.
//
// The front end is responsible for:
// 1. Reading configuration from environment variables
// 2. Asking the operator for the session details
// 3. Building the configured document store
// 4. Running the interactive menu and closing the store afterwards
//
// ## Configuration
//
// - `KNOWN_HOSTS_PATH`: Known-hosts file used to verify the SFTP server (required for sftp)
// - `HOSTMAP_STORE_TYPE`: Store type (sftp, file, memory); default sftp
// - `HOSTMAP_STORE_PATH`: Document path (required for file)
// - `HOSTMAP_LOG_LEVEL`: trace, debug, info, warn, error; default warn
//
// Logs go to stderr; the menu uses stdout.
//
// ## Example
//
// ```bash
// export KNOWN_HOSTS_PATH=$HOME/.ssh/known_hosts
// hostmapctl
// ```

mod menu;
mod prompt;

use anyhow::Result;
use hostmap_core::config::{DEFAULT_SFTP_PORT, SftpConfig, StoreConfig};
use hostmap_core::{Error, HostMapEngine, StoreRegistry};
use std::env;
use std::process::ExitCode;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::prompt::Prompter;

/// Exit codes for different termination scenarios
///
/// - 0: Clean exit
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostmapExitCode {
    /// Clean exit (operator chose to leave)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<HostmapExitCode> for ExitCode {
    fn from(code: HostmapExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    store_type: String,
    store_path: Option<String>,
    known_hosts_path: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            store_type: lookup("HOSTMAP_STORE_TYPE").unwrap_or_else(|| "sftp".to_string()),
            store_path: lookup("HOSTMAP_STORE_PATH").filter(|s| !s.is_empty()),
            known_hosts_path: lookup("KNOWN_HOSTS_PATH").filter(|s| !s.is_empty()),
            log_level: lookup("HOSTMAP_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "sftp" => {
                if !cfg!(feature = "sftp") {
                    anyhow::bail!(
                        "HOSTMAP_STORE_TYPE 'sftp' needs the `sftp` feature. \
                        Rebuild with default features or pick file or memory."
                    );
                }
                if self.known_hosts_path.is_none() {
                    anyhow::bail!(
                        "Environment variable KNOWN_HOSTS_PATH is not set. \
                        Set it via: export KNOWN_HOSTS_PATH=$HOME/.ssh/known_hosts"
                    );
                }
            }
            "file" => {
                if self.store_path.is_none() {
                    anyhow::bail!(
                        "HOSTMAP_STORE_PATH is required when HOSTMAP_STORE_TYPE=file. \
                        Set it via: export HOSTMAP_STORE_PATH=/var/lib/hostmap/hosts.json"
                    );
                }
            }
            "memory" => {}
            other => anyhow::bail!(
                "HOSTMAP_STORE_TYPE '{}' is not supported. \
                Supported types: sftp, file, memory",
                other
            ),
        }

        self.log_level()?;
        Ok(())
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "HOSTMAP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return HostmapExitCode::ConfigError.into();
    }

    let log_level = config.log_level().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HostmapExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HostmapExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Build the store, run the menu, close the store
async fn run(config: Config) -> HostmapExitCode {
    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    let store_config = match store_config(&config, &mut prompter).await {
        Ok(store_config) => store_config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return HostmapExitCode::ConfigError;
        }
    };

    let registry = StoreRegistry::with_builtin();
    #[cfg(feature = "sftp")]
    hostmap_sftp::register(&registry);

    let store = match registry.create_store(&store_config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Failed to open the document store: {}", e);
            return startup_exit_code(&e);
        }
    };

    let engine = HostMapEngine::new(store);
    info!("Using document at {}", engine.location());

    // The store is closed on every path out of the menu
    let menu_result = menu::run_menu(&engine, &mut prompter).await;
    let close_result = engine.close().await;

    match (menu_result, close_result) {
        (Ok(()), Ok(())) => HostmapExitCode::CleanShutdown,
        (Err(e), _) => {
            error!("Terminal I/O failed: {}", e);
            HostmapExitCode::RuntimeError
        }
        (Ok(()), Err(e)) => {
            eprintln!("Failed to close the document store: {}", e);
            HostmapExitCode::RuntimeError
        }
    }
}

/// Setup and trust failures are configuration errors; transport failures are runtime errors
fn startup_exit_code(err: &Error) -> HostmapExitCode {
    if err.is_fatal_at_startup() {
        HostmapExitCode::ConfigError
    } else {
        HostmapExitCode::RuntimeError
    }
}

/// Turn the environment plus the operator's answers into a store configuration
async fn store_config<R, W>(config: &Config, prompter: &mut Prompter<R, W>) -> Result<StoreConfig>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let store_config = match config.store_type.as_str() {
        "sftp" => StoreConfig::Sftp(ask_sftp_session(config, prompter).await?),
        "file" => StoreConfig::File {
            path: config.store_path.clone().unwrap_or_default(),
        },
        _ => StoreConfig::Memory,
    };

    store_config.validate()?;
    Ok(store_config)
}

/// Ask for host, port, login, password and remote path, in that order
async fn ask_sftp_session<R, W>(config: &Config, prompter: &mut Prompter<R, W>) -> Result<SftpConfig>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let host = ask_required(prompter, "Enter SFTP server address: ").await?;
    let port = ask_required(prompter, "Enter SFTP server port: ").await?;
    let port = parse_port(&port)?;
    let username = ask_required(prompter, "Enter login: ").await?;
    let password = ask_required(prompter, "Enter password: ").await?;
    let remote_path = ask_required(prompter, "Enter path to the file on the SFTP server: ").await?;

    Ok(SftpConfig {
        host: host.trim().to_string(),
        port,
        username,
        password,
        remote_path,
        known_hosts_path: config.known_hosts_path.clone().unwrap_or_default(),
    })
}

async fn ask_required<R, W>(prompter: &mut Prompter<R, W>, label: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match prompter.ask(label).await? {
        Some(answer) => Ok(answer),
        None => anyhow::bail!("Input ended before the session details were complete"),
    }
}

/// Parse the port answer; empty means the SSH default
fn parse_port(answer: &str) -> Result<u16> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(DEFAULT_SFTP_PORT);
    }

    match answer.parse::<u16>() {
        Ok(0) | Err(_) => anyhow::bail!("Port must be a number between 1 and 65535. Got: {}", answer),
        Ok(port) => Ok(port),
    }
}
