//! Ignore/restore workflow
//!
//! Targets are sent in chunks of at most [`MAX_TARGETS_PER_REQUEST`]. Every
//! chunk is attempted; a failed chunk does not undo or stop the others.

use tracing::{info, warn};

use vmignore_client::{IgnoreOutcome, RestoreOutcome, Session};
use vmignore_core::{
    chunked, split_targets, Action, Error, IgnoreRequest, RestoreRequest, Result,
    MAX_TARGETS_PER_REQUEST,
};

use crate::prompt::Prompter;

/// Everything the operator entered for one ignore/restore run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub action: Action,
    /// QIDs as typed, up to 10 comma-separated
    pub qids: String,
    pub targets: Vec<String>,
    pub comments: String,
    /// Only set for [`Action::Ignore`]
    pub reopen_date: Option<String>,
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Ignored(IgnoreOutcome),
    Restored(RestoreOutcome),
    /// The request or its decoding failed
    Failed(String),
}

impl ChunkOutcome {
    /// Operator-facing summary
    pub fn summary(&self) -> String {
        match self {
            ChunkOutcome::Ignored(IgnoreOutcome::Success { status, affected }) => {
                format!("{} ignored {}", status, affected)
            }
            ChunkOutcome::Ignored(IgnoreOutcome::Failure { message }) => {
                format!("Error {}", message)
            }
            ChunkOutcome::Restored(RestoreOutcome { body, .. }) => body.clone(),
            ChunkOutcome::Failed(message) => format!("Error {}", message),
        }
    }

    /// Whether upstream or the transport reported a failure for this chunk.
    ///
    /// Restore bodies without a recognizable status count as accepted.
    pub fn is_failure(&self) -> bool {
        match self {
            ChunkOutcome::Ignored(IgnoreOutcome::Success { .. }) => false,
            ChunkOutcome::Ignored(IgnoreOutcome::Failure { .. }) => true,
            ChunkOutcome::Restored(RestoreOutcome { status, .. }) => {
                status.as_deref().is_some_and(|s| s != "SUCCESS")
            }
            ChunkOutcome::Failed(_) => true,
        }
    }
}

/// Result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// Comma-joined targets sent in this chunk
    pub ips: String,
    pub outcome: ChunkOutcome,
}

/// Collect the plan from the operator and run it
pub fn perform_action<P: Prompter>(session: &Session, prompter: &mut P) -> Result<()> {
    let plan = collect_plan(prompter)?;
    if plan.targets.is_empty() {
        return Err(Error::InvalidInput(String::from("no IP targets given")));
    }
    execute(session, prompter, &plan)?;
    Ok(())
}

/// Ask for QIDs, action, targets, comment and (for ignore) the reopen date
pub fn collect_plan<P: Prompter>(prompter: &mut P) -> Result<ActionPlan> {
    let qids = prompter.ask("QID: ")?.trim().to_string();
    let action = ask_action(prompter)?;
    let targets = split_targets(&prompter.ask("IP target: ")?);
    let comments = prompter.ask("Comment: ")?;
    let reopen_date = match action {
        Action::Ignore => Some(prompter.ask("Reopen date: ")?.trim().to_string()),
        Action::Restore => None,
    };

    Ok(ActionPlan {
        action,
        qids,
        targets,
        comments,
        reopen_date,
    })
}

fn ask_action<P: Prompter>(prompter: &mut P) -> Result<Action> {
    loop {
        if let Ok(action) = prompter.ask("Ignore or Restore (i/r): ")?.parse() {
            return Ok(action);
        }
    }
}

/// Send one request per chunk of targets, reporting each as it completes
pub fn execute<P: Prompter>(
    session: &Session,
    prompter: &mut P,
    plan: &ActionPlan,
) -> Result<Vec<ChunkReport>> {
    let total = plan.targets.len().div_ceil(MAX_TARGETS_PER_REQUEST);
    info!(
        "{} QID(s) {} on {} target(s) in {} request(s)",
        plan.action,
        plan.qids,
        plan.targets.len(),
        total
    );

    let mut reports = Vec::with_capacity(total);
    let chunks = chunked(plan.targets.iter().map(String::as_str), MAX_TARGETS_PER_REQUEST);

    for (i, chunk) in chunks.enumerate() {
        let ips = chunk.join(",");
        let outcome = send_chunk(session, plan, &ips);
        if outcome.is_failure() {
            warn!(
                "{} chunk {}/{} failed: {}",
                plan.action,
                i + 1,
                total,
                outcome.summary()
            );
        }

        prompter.say(&format!(
            "[{}/{}] {} target(s): {}",
            i + 1,
            total,
            chunk.len(),
            outcome.summary()
        ))?;
        reports.push(ChunkReport {
            ips,
            outcome,
        });
    }

    Ok(reports)
}

fn send_chunk(session: &Session, plan: &ActionPlan, ips: &str) -> ChunkOutcome {
    let result = match plan.action {
        Action::Ignore => session
            .ignore(&IgnoreRequest {
                qids: plan.qids.clone(),
                ips: ips.to_string(),
                comments: plan.comments.clone(),
                reopen_date: plan.reopen_date.clone().unwrap_or_default(),
            })
            .map(ChunkOutcome::Ignored),
        Action::Restore => session
            .restore(&RestoreRequest {
                qids: plan.qids.clone(),
                ips: ips.to_string(),
                comments: plan.comments.clone(),
            })
            .map(ChunkOutcome::Restored),
    };

    result.unwrap_or_else(|e| ChunkOutcome::Failed(Error::from(e).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Scripted;

    #[test]
    fn test_collect_ignore_plan() {
        let mut prompter = Scripted::new([
            "38173,38174",
            "x",
            "IGNORE",
            "10.0.0.1, 10.0.0.2",
            "accepted risk",
            "12/31/2026",
        ]);
        let plan = collect_plan(&mut prompter).unwrap();

        assert_eq!(plan.action, Action::Ignore);
        assert_eq!(plan.qids, "38173,38174");
        assert_eq!(plan.targets, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(plan.comments, "accepted risk");
        assert_eq!(plan.reopen_date.as_deref(), Some("12/31/2026"));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_restore_plan_skips_reopen_date() {
        let mut prompter = Scripted::new(["38173", "r", "10.0.0.1", "fixed"]);
        let plan = collect_plan(&mut prompter).unwrap();

        assert_eq!(plan.action, Action::Restore);
        assert_eq!(plan.reopen_date, None);
        assert!(!prompter.prompts().contains(&"Reopen date: "));
    }

    #[test]
    fn test_invalid_action_reprompts() {
        let mut prompter = Scripted::new(["1", "", "ignored", "q", "Restore", "10.0.0.1", ""]);
        let plan = collect_plan(&mut prompter).unwrap();
        assert_eq!(plan.action, Action::Restore);
        let action_prompts = prompter
            .prompts()
            .iter()
            .filter(|p| p.starts_with("Ignore or Restore"))
            .count();
        assert_eq!(action_prompts, 4);
    }

    #[test]
    fn test_summaries() {
        let ok = ChunkOutcome::Ignored(IgnoreOutcome::Success {
            status: String::from("SUCCESS"),
            affected: 42,
        });
        assert_eq!(ok.summary(), "SUCCESS ignored 42");

        let failed = ChunkOutcome::Ignored(IgnoreOutcome::Failure {
            message: String::from("Invalid QID"),
        });
        assert_eq!(failed.summary(), "Error Invalid QID");

        let restored = ChunkOutcome::Restored(RestoreOutcome {
            status: None,
            body: String::from("<raw/>"),
        });
        assert_eq!(restored.summary(), "<raw/>");
    }

    #[test]
    fn test_failure_classification() {
        let ok = ChunkOutcome::Ignored(IgnoreOutcome::Success {
            status: String::from("SUCCESS"),
            affected: 1,
        });
        assert!(!ok.is_failure());
        assert!(ChunkOutcome::Failed(String::from("timed out")).is_failure());
        assert!(ChunkOutcome::Ignored(IgnoreOutcome::Failure {
            message: String::from("Invalid QID"),
        })
        .is_failure());
    }

    #[test]
    fn test_restore_status_drives_failure() {
        let restored = |status: Option<&str>| {
            ChunkOutcome::Restored(RestoreOutcome {
                status: status.map(String::from),
                body: String::from("body"),
            })
        };
        assert!(restored(Some("FAILED")).is_failure());
        assert!(!restored(Some("SUCCESS")).is_failure());
        assert!(!restored(None).is_failure());
    }
}
