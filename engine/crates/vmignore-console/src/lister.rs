//! Vulnerability listing for one host

use tracing::{debug, info};

use vmignore_client::Session;
use vmignore_core::{Error, Host, HostSelection, Result};

use crate::prompt::Prompter;

/// Show the detections of the host matching `ips`, ignored ones included.
///
/// When several hosts match, the operator picks one first.
pub fn list_vulnerabilities<P: Prompter>(
    session: &Session,
    prompter: &mut P,
    ips: &str,
) -> Result<()> {
    let selection = session.list_detections(ips)?;
    info!("Detection list for {} returned {} host(s)", ips, selection.len());

    let host = choose_host(prompter, selection)?
        .ok_or_else(|| Error::NotFound(format!("No host found for {}", ips)))?;
    render_detections(prompter, &host)
}

/// Resolve a selection to one host, asking the operator when several match
pub fn choose_host<P: Prompter>(
    prompter: &mut P,
    selection: HostSelection,
) -> Result<Option<Host>> {
    let mut hosts = match selection {
        HostSelection::Single(host) => return Ok(Some(host)),
        HostSelection::Many(hosts) if hosts.is_empty() => return Ok(None),
        HostSelection::Many(hosts) => hosts,
    };

    prompter.say("Multiple hosts matching, please select:")?;
    for (i, host) in hosts.iter().enumerate() {
        prompter.say(&format!("{}. {}", i + 1, host.summary_line()))?;
    }

    let choice = ask_index(prompter, "Selection: ", hosts.len())?;
    Ok(Some(hosts.swap_remove(choice - 1)))
}

/// Ask until the answer is a number in `1..=count`
pub fn ask_index<P: Prompter>(prompter: &mut P, label: &str, count: usize) -> Result<usize> {
    loop {
        let answer = prompter.ask(label)?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n),
            _ => debug!("Rejected selection {:?} (1..={})", answer, count),
        }
    }
}

/// One tab-separated line per detection, in upstream order
pub fn render_detections<P: Prompter>(prompter: &mut P, host: &Host) -> Result<()> {
    if host.detections.is_empty() {
        prompter.say(&format!("No detections for host {}", host.id))?;
        return Ok(());
    }
    for detection in &host.detections {
        prompter.say(&detection.report_line())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Scripted;
    use vmignore_core::Detection;

    fn host(id: &str, qids: &[&str]) -> Host {
        Host {
            id: id.to_string(),
            ip: String::from("10.0.0.5"),
            tracking_method: String::from("IP"),
            hostname: format!("host-{}", id),
            detections: qids
                .iter()
                .map(|qid| Detection {
                    qid: qid.to_string(),
                    kind: String::from("Confirmed"),
                    ignored: false,
                    status: String::from("Active"),
                    results: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_single_host_needs_no_prompt() {
        let mut prompter = Scripted::new(Vec::<String>::new());
        let chosen = choose_host(&mut prompter, HostSelection::Single(host("1", &["38173"])))
            .unwrap()
            .unwrap();
        render_detections(&mut prompter, &chosen).unwrap();

        assert!(prompter.prompts().is_empty());
        assert_eq!(prompter.output(), vec!["38173\tConfirmed\tActive\t"]);
    }

    #[test]
    fn test_select_second_of_three() {
        let selection = HostSelection::Many(vec![
            host("1", &["100"]),
            host("2", &["200", "201"]),
            host("3", &["300"]),
        ]);
        let mut prompter = Scripted::new(["2"]);
        let chosen = choose_host(&mut prompter, selection).unwrap().unwrap();
        render_detections(&mut prompter, &chosen).unwrap();

        assert_eq!(chosen.id, "2");
        let output = prompter.output();
        assert_eq!(output[0], "Multiple hosts matching, please select:");
        assert_eq!(output[1], "1. 1\t10.0.0.5\tIP\thost-1");
        assert_eq!(output[3], "3. 3\t10.0.0.5\tIP\thost-3");
        assert_eq!(
            &output[4..],
            &["200\tConfirmed\tActive\t", "201\tConfirmed\tActive\t"]
        );
    }

    #[test]
    fn test_out_of_range_and_garbage_reprompt() {
        let selection = HostSelection::Many(vec![host("1", &[]), host("2", &[]), host("3", &[])]);
        let mut prompter = Scripted::new(["0", "4", "two", "", "-1", "3"]);
        let chosen = choose_host(&mut prompter, selection).unwrap().unwrap();

        assert_eq!(chosen.id, "3");
        assert_eq!(prompter.prompts().len(), 6);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_exhausted_input_is_an_error() {
        let selection = HostSelection::Many(vec![host("1", &[]), host("2", &[])]);
        let mut prompter = Scripted::new(["9"]);
        let err = choose_host(&mut prompter, selection).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_no_hosts() {
        let mut prompter = Scripted::new(Vec::<String>::new());
        let chosen = choose_host(&mut prompter, HostSelection::Many(Vec::new())).unwrap();
        assert!(chosen.is_none());
    }

    #[test]
    fn test_host_without_detections() {
        let mut prompter = Scripted::new(Vec::<String>::new());
        render_detections(&mut prompter, &host("9", &[])).unwrap();
        assert_eq!(prompter.output(), vec!["No detections for host 9"]);
    }
}
