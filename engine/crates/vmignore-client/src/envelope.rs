//! Typed readers for the decoded response envelopes

use crate::decode::{decode, DecodeError, EnvelopeKind, Value};
use vmignore_core::{Detection, Host, HostSelection};

/// Result of one ignore call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreOutcome {
    /// Upstream accepted the request and changed `affected` detections
    Success { status: String, affected: u64 },
    /// Upstream rejected the request
    Failure { message: String },
}

/// Result of one restore call: the raw body plus whatever status it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub status: Option<String>,
    pub body: String,
}

/// Hosts in a host list or detection list response.
///
/// A response whose envelope holds no hosts yields an empty
/// [`HostSelection::Many`].
pub fn host_selection(xml: &str, kind: EnvelopeKind) -> Result<HostSelection, DecodeError> {
    let node = match decode(xml, kind) {
        Ok(node) => node,
        Err(DecodeError::MissingNode(_)) => return Ok(HostSelection::Many(Vec::new())),
        Err(e) => return Err(e),
    };

    Ok(match &node {
        Value::List(items) => HostSelection::Many(items.iter().map(host_from).collect()),
        Value::Map(_) => HostSelection::Single(host_from(&node)),
        _ => HostSelection::Many(Vec::new()),
    })
}

fn host_from(node: &Value) -> Host {
    let hostname = match node.at(&["DNS_DATA", "HOSTNAME"]).and_then(Value::as_text) {
        Some(name) => name,
        None => node.text("DNS"),
    };

    let detections: Vec<Detection> = node
        .at(&["DETECTION_LIST", "DETECTION"])
        .map(|list| list.items().iter().map(detection_from).collect())
        .unwrap_or_default();

    Host {
        id: node.text("ID").to_string(),
        ip: node.text("IP").to_string(),
        tracking_method: node.text("TRACKING_METHOD").to_string(),
        hostname: hostname.to_string(),
        detections,
    }
}

fn detection_from(node: &Value) -> Detection {
    Detection {
        qid: node.text("QID").to_string(),
        kind: node.text("TYPE").to_string(),
        ignored: node.text("IS_IGNORED") == "1",
        status: node.text("STATUS").to_string(),
        results: node.text("RESULTS").to_string(),
    }
}

/// Status, count or error message of an ignore response
pub fn ignore_outcome(xml: &str) -> Result<IgnoreOutcome, DecodeError> {
    let response = decode(xml, EnvelopeKind::IgnoreResult)?;
    let status = response.text("@status");

    if status != "SUCCESS" {
        return Ok(IgnoreOutcome::Failure {
            message: response.text("MESSAGE").to_string(),
        });
    }

    let number = response.text("@number");
    let affected = if number.is_empty() {
        0
    } else {
        number.parse().map_err(|_| {
            DecodeError::Malformed(format!("affected count '{}' is not a number", number))
        })?
    };

    Ok(IgnoreOutcome::Success {
        status: status.to_string(),
        affected,
    })
}

/// Restore responses are reported verbatim; the status is picked out when
/// the body happens to be an ignore-style envelope.
pub fn restore_outcome(body: String) -> RestoreOutcome {
    let status = decode(&body, EnvelopeKind::RestoreResult)
        .ok()
        .map(|response| response.text("@status").to_string())
        .filter(|status| !status.is_empty());

    RestoreOutcome { status, body }
}
