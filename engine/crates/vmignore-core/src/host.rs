//! Host and detection records returned by the detection list

/// A vulnerability detected on a host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Vulnerability identifier in the upstream knowledge base
    pub qid: String,
    /// Detection type (e.g. "Confirmed", "Potential", "Info")
    pub kind: String,
    /// Whether the detection is currently ignored
    pub ignored: bool,
    /// Lifecycle status (e.g. "Active", "Fixed", "Re-Opened")
    pub status: String,
    /// Free-text scan result
    pub results: String,
}

impl Detection {
    /// Maximum number of result characters shown in a report line
    pub const RESULTS_PREVIEW_CHARS: usize = 60;

    /// Status column for display: "IGNORED" wins over the upstream status
    pub fn display_status(&self) -> &str {
        if self.ignored {
            "IGNORED"
        } else {
            &self.status
        }
    }

    /// The first 60 characters of the result text
    pub fn results_preview(&self) -> &str {
        match self
            .results
            .char_indices()
            .nth(Self::RESULTS_PREVIEW_CHARS)
        {
            Some((end, _)) => &self.results[..end],
            None => &self.results,
        }
    }

    /// Tab-separated report line: QID, type, status, result preview
    pub fn report_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.qid,
            self.kind,
            self.display_status(),
            self.results_preview()
        )
    }
}

/// A host record with its detections, in upstream order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Host {
    pub id: String,
    pub ip: String,
    pub tracking_method: String,
    pub hostname: String,
    pub detections: Vec<Detection>,
}

impl Host {
    /// Candidate line shown when several hosts match: ID, IP, tracking method, hostname
    pub fn summary_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.id, self.ip, self.tracking_method, self.hostname
        )
    }
}

/// Hosts matching an IP expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSelection {
    /// Exactly one host matched
    Single(Host),
    /// Several hosts matched; the operator must pick one
    Many(Vec<Host>),
}

impl HostSelection {
    /// Number of hosts in the selection
    pub fn len(&self) -> usize {
        match self {
            HostSelection::Single(_) => 1,
            HostSelection::Many(hosts) => hosts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All hosts, in upstream order
    pub fn into_hosts(self) -> Vec<Host> {
        match self {
            HostSelection::Single(host) => vec![host],
            HostSelection::Many(hosts) => hosts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(ignored: bool, status: &str, results: &str) -> Detection {
        Detection {
            qid: String::from("38173"),
            kind: String::from("Confirmed"),
            ignored,
            status: status.to_string(),
            results: results.to_string(),
        }
    }

    #[test]
    fn test_ignored_overrides_status() {
        let det = detection(true, "Active", "");
        assert_eq!(det.display_status(), "IGNORED");
        assert_eq!(det.report_line(), "38173\tConfirmed\tIGNORED\t");
    }

    #[test]
    fn test_status_shown_when_not_ignored() {
        let det = detection(false, "Active", "TLSv1.0 is enabled");
        assert_eq!(
            det.report_line(),
            "38173\tConfirmed\tActive\tTLSv1.0 is enabled"
        );
    }

    #[test]
    fn test_results_truncated_to_sixty_chars() {
        let long = "x".repeat(61) + "tail";
        let det = detection(false, "Active", &long);
        assert_eq!(det.results_preview().chars().count(), 60);
        assert_eq!(det.results_preview(), "x".repeat(60));

        let exact = "y".repeat(60);
        let det = detection(false, "Active", &exact);
        assert_eq!(det.results_preview(), exact);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(70);
        let det = detection(false, "New", &long);
        assert_eq!(det.results_preview(), "é".repeat(60));
    }

    #[test]
    fn test_selection_len() {
        let single = HostSelection::Single(Host::default());
        assert_eq!(single.len(), 1);
        let many = HostSelection::Many(vec![Host::default(), Host::default()]);
        assert_eq!(many.len(), 2);
        assert_eq!(many.into_hosts().len(), 2);
    }
}
