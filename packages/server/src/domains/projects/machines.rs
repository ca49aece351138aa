//! Project workflow machine
//!
//! Pure decision logic - NO IO. Given the current status and something that happened,
//! decide which statuses the project walks through and which webhook (if any) fires.

use serde::Serialize;

use super::status::{validate_transition, ProjectStatus, TransitionError};
use crate::domains::webhooks::WebhookType;

/// Things that move a project through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    // Automated stages
    ResearchStarted,
    ResearchCompleted,
    ScriptingStarted,
    ScriptDelivered,
    ProductionStarted,
    VideoDelivered,

    // Admin review
    ScriptApproved,
    ScriptRejected,
    VideoApproved,
    VideoRejected,
    ChangesRequested,
    Completed,
    Cancelled,

    // Editor work
    EditingStarted,
    FinalSubmitted,
}

/// Outcome of a legal event: the statuses to pass through and the webhook to fire after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub from: ProjectStatus,
    /// Every status entered, in order. Never empty.
    pub path: Vec<ProjectStatus>,
    pub webhook: Option<WebhookType>,
}

impl Decision {
    pub fn to(&self) -> ProjectStatus {
        self.path.last().copied().unwrap_or(self.from)
    }

    /// (from, to) for each step, for activity logging.
    pub fn steps(&self) -> impl Iterator<Item = (ProjectStatus, ProjectStatus)> + '_ {
        std::iter::once(self.from)
            .chain(self.path.iter().copied())
            .zip(self.path.iter().copied())
    }
}

pub struct ProjectMachine;

impl ProjectMachine {
    pub fn decide(
        current: ProjectStatus,
        event: WorkflowEvent,
    ) -> Result<Decision, TransitionError> {
        use ProjectStatus as S;
        use WorkflowEvent as E;

        let (path, webhook): (Vec<ProjectStatus>, Option<WebhookType>) = match event {
            E::ResearchStarted => (vec![S::ResearchInProgress], Some(WebhookType::Research)),
            E::ResearchCompleted => (vec![S::ResearchComplete], None),
            E::ScriptingStarted => (vec![S::ScriptInProgress], Some(WebhookType::Scripting)),
            E::ScriptDelivered => (vec![S::ScriptPendingApproval], None),
            E::ProductionStarted => {
                (vec![S::ProductionInProgress], Some(WebhookType::Production))
            }
            E::VideoDelivered => (vec![S::ProductionPendingApproval], None),

            E::ScriptApproved => (
                vec![S::ScriptApproved, S::ProductionInProgress],
                Some(WebhookType::Production),
            ),
            E::ScriptRejected => (vec![S::ScriptInProgress], Some(WebhookType::Optimizer)),
            E::VideoApproved => (vec![S::EditingAssigned], Some(WebhookType::Notification)),
            E::VideoRejected => (vec![S::ProductionInProgress], Some(WebhookType::Production)),
            E::ChangesRequested => {
                (vec![S::EditingInProgress], Some(WebhookType::Notification))
            }
            E::Completed => (vec![S::Completed], Some(WebhookType::Notification)),
            E::Cancelled => (vec![S::Cancelled], None),

            E::EditingStarted => (vec![S::EditingInProgress], None),
            // An editor may submit without explicitly starting first
            E::FinalSubmitted if current == S::EditingAssigned => (
                vec![S::EditingInProgress, S::FinalReview],
                Some(WebhookType::Notification),
            ),
            E::FinalSubmitted => (vec![S::FinalReview], Some(WebhookType::Notification)),
        };

        let mut from = current;
        for &to in &path {
            validate_transition(from, to)?;
            from = to;
        }

        Ok(Decision {
            from: current,
            path,
            webhook,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProjectStatus as S;
    use WorkflowEvent as E;

    #[test]
    fn test_research_started_fires_research() {
        let decision = ProjectMachine::decide(S::Created, E::ResearchStarted).unwrap();
        assert_eq!(decision.to(), S::ResearchInProgress);
        assert_eq!(decision.webhook, Some(WebhookType::Research));
    }

    #[test]
    fn test_script_approval_walks_into_production() {
        let decision = ProjectMachine::decide(S::ScriptPendingApproval, E::ScriptApproved).unwrap();
        assert_eq!(
            decision.path,
            vec![S::ScriptApproved, S::ProductionInProgress]
        );
        assert_eq!(decision.webhook, Some(WebhookType::Production));
        assert_eq!(
            decision.steps().collect::<Vec<_>>(),
            vec![
                (S::ScriptPendingApproval, S::ScriptApproved),
                (S::ScriptApproved, S::ProductionInProgress)
            ]
        );
    }

    #[test]
    fn test_script_rejection_fires_optimizer() {
        let decision = ProjectMachine::decide(S::ScriptPendingApproval, E::ScriptRejected).unwrap();
        assert_eq!(decision.to(), S::ScriptInProgress);
        assert_eq!(decision.webhook, Some(WebhookType::Optimizer));
    }

    #[test]
    fn test_video_approval_accepts_legacy_status() {
        for from in [S::ProductionPendingApproval, S::ProductionApproved] {
            let decision = ProjectMachine::decide(from, E::VideoApproved).unwrap();
            assert_eq!(decision.to(), S::EditingAssigned);
            assert_eq!(decision.webhook, Some(WebhookType::Notification));
        }
    }

    #[test]
    fn test_final_submit_from_assigned_passes_through_editing() {
        let decision = ProjectMachine::decide(S::EditingAssigned, E::FinalSubmitted).unwrap();
        assert_eq!(decision.path, vec![S::EditingInProgress, S::FinalReview]);

        let decision = ProjectMachine::decide(S::EditingInProgress, E::FinalSubmitted).unwrap();
        assert_eq!(decision.path, vec![S::FinalReview]);
    }

    #[test]
    fn test_callbacks_without_webhook() {
        for (from, event, to) in [
            (S::ResearchInProgress, E::ResearchCompleted, S::ResearchComplete),
            (S::ScriptInProgress, E::ScriptDelivered, S::ScriptPendingApproval),
            (S::ProductionInProgress, E::VideoDelivered, S::ProductionPendingApproval),
            (S::EditingAssigned, E::EditingStarted, S::EditingInProgress),
        ] {
            let decision = ProjectMachine::decide(from, event).unwrap();
            assert_eq!(decision.to(), to);
            assert_eq!(decision.webhook, None);
        }
    }

    #[test]
    fn test_wrong_status_reports_first_step_error() {
        let err = ProjectMachine::decide(S::Created, E::ScriptApproved).unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotAllowed {
                from: S::Created,
                to: S::ScriptApproved
            }
        );

        let err = ProjectMachine::decide(S::ResearchInProgress, E::ScriptDelivered).unwrap_err();
        assert!(err.to_string().starts_with("Cannot transition from 'Researching'"));
    }

    #[test]
    fn test_cancel_from_any_active_status() {
        for status in ProjectStatus::ALL {
            let result = ProjectMachine::decide(status, E::Cancelled);
            if status.is_terminal() {
                assert_eq!(result.unwrap_err(), TransitionError::Terminal { from: status });
            } else {
                assert_eq!(result.unwrap().to(), S::Cancelled);
            }
        }
    }

    #[test]
    fn test_completed_project_rejects_everything() {
        for event in [E::ChangesRequested, E::Completed, E::FinalSubmitted, E::Cancelled] {
            assert!(ProjectMachine::decide(S::Completed, event).is_err());
        }
    }
}
