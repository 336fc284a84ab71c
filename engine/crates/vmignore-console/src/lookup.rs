//! Host lookup by IP expression

use vmignore_client::Session;
use vmignore_core::{Error, Host, Result};

use crate::prompt::Prompter;

/// Show `ID<TAB>HOSTNAME` for every host matching `ips`
pub fn lookup_host<P: Prompter>(session: &Session, prompter: &mut P, ips: &str) -> Result<()> {
    let hosts = session.list_hosts(ips)?.into_hosts();
    if hosts.is_empty() {
        return Err(Error::NotFound(format!("No host found for {}", ips)));
    }
    for host in &hosts {
        prompter.say(&host_line(host))?;
    }
    Ok(())
}

fn host_line(host: &Host) -> String {
    format!("{}\t{}", host.id, host.hostname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_line() {
        let host = Host {
            id: String::from("1001"),
            hostname: String::from("web01.corp"),
            ..Host::default()
        };
        assert_eq!(host_line(&host), "1001\tweb01.corp");
    }
}
