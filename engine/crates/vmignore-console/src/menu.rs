//! Top-level interactive menu

use std::str::FromStr;

use tracing::{error, info, warn};

use vmignore_client::Session;
use vmignore_core::Result;

use crate::prompt::Prompter;
use crate::{lister, lookup, orchestrator};

/// Menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListVulnerabilities,
    IgnoreRestore,
    LookupHost,
    Quit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::ListVulnerabilities),
            "2" => Ok(MenuChoice::IgnoreRestore),
            "3" => Ok(MenuChoice::LookupHost),
            "q" | "Q" => Ok(MenuChoice::Quit),
            other => Err(other.to_string()),
        }
    }
}

const MENU: [&str; 4] = [
    "1. List host vulnerabilities",
    "2. Ignore or restore vulnerability",
    "3. Look up host",
    "q: quit",
];

/// Run the menu until the operator quits, then log out.
///
/// The session is closed exactly once on every exit path: here after the
/// loop, or by its `Drop` if the loop panics.
pub fn run<P: Prompter>(session: Session, prompter: &mut P) -> Result<()> {
    let result = menu_loop(&session, prompter);
    if let Err(ref e) = result {
        error!(code = e.code(), "Leaving menu: {}", e);
    }
    session.close();
    result
}

fn menu_loop<P: Prompter>(session: &Session, prompter: &mut P) -> Result<()> {
    loop {
        for line in MENU {
            prompter.say(line)?;
        }

        let choice = match prompter.ask("Action: ")?.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(other) => {
                info!("Ignoring menu input {:?}", other);
                continue;
            }
        };

        let outcome = match choice {
            MenuChoice::ListVulnerabilities => {
                let ips = prompter.ask("IP address: ")?;
                lister::list_vulnerabilities(session, prompter, ips.trim())
            }
            MenuChoice::IgnoreRestore => orchestrator::perform_action(session, prompter),
            MenuChoice::LookupHost => {
                let ips = prompter.ask("IP address: ")?;
                lookup::lookup_host(session, prompter, ips.trim())
            }
            MenuChoice::Quit => return Ok(()),
        };

        if let Err(e) = outcome {
            if e.is_fatal() {
                return Err(e);
            }
            warn!(code = e.code(), "{}", e);
            prompter.say(&format!("Error: {}", e))?;
        }
    }
}
