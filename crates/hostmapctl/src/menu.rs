//! Interactive menu
//!
//! One numbered action per iteration. Operation errors (duplicate or
//! invalid input, missing keys) are printed and the menu comes back; store
//! and document failures are printed and logged, and the menu comes back
//! too. Only a broken terminal ends the loop with an error.

use hostmap_core::{Error, HostMapEngine, Removal};
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{error, info};

use crate::prompt::Prompter;

const MENU: &[&str] = &[
    "",
    "Choose an action:",
    "1. List 'domain - address' pairs",
    "2. Get IP address by domain",
    "3. Get domain by IP address",
    "4. Add a new 'domain - address' pair",
    "5. Remove a 'domain - address' pair",
    "6. Exit",
];

/// A numbered menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    List,
    ResolveDomain,
    ResolveIp,
    Add,
    Remove,
    Exit,
}

impl MenuChoice {
    /// Parse the operator's answer; surrounding whitespace is ignored
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(Self::List),
            "2" => Some(Self::ResolveDomain),
            "3" => Some(Self::ResolveIp),
            "4" => Some(Self::Add),
            "5" => Some(Self::Remove),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Whether the loop goes on after an action
enum Flow {
    Continue,
    Exit,
}

/// Run the menu until the operator exits or input ends
pub async fn run_menu<R, W>(engine: &HostMapEngine, prompter: &mut Prompter<R, W>) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        for line in MENU {
            prompter.say(line).await?;
        }

        let Some(answer) = prompter.ask("Your choice: ").await? else {
            info!("End of input, leaving the menu");
            return Ok(());
        };

        let flow = match MenuChoice::parse(&answer) {
            Some(MenuChoice::Exit) => Flow::Exit,
            Some(choice) => run_action(engine, prompter, choice).await?,
            None => {
                prompter.say("Invalid choice").await?;
                Flow::Continue
            }
        };

        if let Flow::Exit = flow {
            return Ok(());
        }
    }
}

async fn run_action<R, W>(
    engine: &HostMapEngine,
    prompter: &mut Prompter<R, W>,
    choice: MenuChoice,
) -> io::Result<Flow>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match choice {
        MenuChoice::List => match engine.list().await {
            Ok(pairs) => {
                for (domain, ip) in pairs {
                    prompter.say(&format!("{} - {}", domain, ip)).await?;
                }
            }
            Err(e) => report(prompter, &e).await?,
        },

        MenuChoice::ResolveDomain => {
            let Some(domain) = prompter.ask("Enter domain name: ").await? else {
                return Ok(Flow::Exit);
            };
            match engine.resolve_domain(&domain).await {
                Ok(Some(ip)) => prompter.say(&ip).await?,
                Ok(None) => prompter.say("Domain not found").await?,
                Err(e) => report(prompter, &e).await?,
            }
        }

        MenuChoice::ResolveIp => {
            let Some(ip) = prompter.ask("Enter IP address: ").await? else {
                return Ok(Flow::Exit);
            };
            match engine.resolve_ip(&ip).await {
                Ok(Some(domain)) => prompter.say(&domain).await?,
                Ok(None) => prompter.say("IP address not found").await?,
                Err(e) => report(prompter, &e).await?,
            }
        }

        MenuChoice::Add => {
            let Some(domain) = prompter.ask("Enter domain name: ").await? else {
                return Ok(Flow::Exit);
            };
            let Some(ip) = prompter.ask("Enter IP address: ").await? else {
                return Ok(Flow::Exit);
            };
            match engine.add(&domain, &ip).await {
                Ok(()) => prompter.say("Pair added").await?,
                Err(e) => report(prompter, &e).await?,
            }
        }

        MenuChoice::Remove => {
            let Some(key) = prompter.ask("Enter domain name or IP address: ").await? else {
                return Ok(Flow::Exit);
            };
            match engine.remove(&key).await {
                Ok(Removal::ByDomain { .. }) => prompter.say("Pair removed by domain").await?,
                Ok(Removal::ByIp { .. }) => prompter.say("Pair removed by IP address").await?,
                Ok(Removal::NotFound) => prompter.say("Domain or IP address not found").await?,
                Err(e) => report(prompter, &e).await?,
            }
        }

        MenuChoice::Exit => return Ok(Flow::Exit),
    }

    Ok(Flow::Continue)
}

/// Operator-facing text for an operation error
fn operator_message(err: &Error) -> String {
    match err {
        Error::DuplicateDomain(_) => "Domain already exists".to_string(),
        Error::DuplicateIp(_) => "IP address already exists".to_string(),
        Error::InvalidIpFormat(_) => "Invalid IP address".to_string(),
        Error::EmptyDomain => "Domain must not be empty".to_string(),
        other => format!("Operation failed: {}", other),
    }
}

async fn report<R, W>(prompter: &mut Prompter<R, W>, err: &Error) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !err.is_recoverable() {
        error!("{}", err);
    }
    prompter.say(&operator_message(err)).await
}
