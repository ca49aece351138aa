//! Project status state machine
//!
//! The transition table below is the single source of truth for which status changes are
//! legal. Everything that moves a project (admin actions, editor actions, webhook callbacks,
//! manual patches) is checked against it before anything is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Created,
    ResearchInProgress,
    ResearchComplete,
    ScriptInProgress,
    ScriptPendingApproval,
    ScriptApproved,
    ProductionInProgress,
    ProductionPendingApproval,
    /// Legacy: approving a video now assigns the editor directly.
    ProductionApproved,
    EditingAssigned,
    EditingInProgress,
    FinalReview,
    Completed,
    Cancelled,
}

use ProjectStatus::*;

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 14] = [
        Created,
        ResearchInProgress,
        ResearchComplete,
        ScriptInProgress,
        ScriptPendingApproval,
        ScriptApproved,
        ProductionInProgress,
        ProductionPendingApproval,
        ProductionApproved,
        EditingAssigned,
        EditingInProgress,
        FinalReview,
        Completed,
        Cancelled,
    ];

    /// Legal next statuses, in display order.
    pub fn transitions(self) -> &'static [ProjectStatus] {
        match self {
            Created => &[ResearchInProgress, Cancelled],
            ResearchInProgress => &[ResearchComplete, Cancelled],
            ResearchComplete => &[ScriptInProgress, Cancelled],
            ScriptInProgress => &[ScriptPendingApproval, Cancelled],
            ScriptPendingApproval => &[ScriptApproved, ScriptInProgress, Cancelled],
            ScriptApproved => &[ProductionInProgress, Cancelled],
            ProductionInProgress => &[ProductionPendingApproval, Cancelled],
            ProductionPendingApproval => &[
                ProductionApproved,
                EditingAssigned,
                ProductionInProgress,
                Cancelled,
            ],
            ProductionApproved => &[EditingAssigned, Cancelled],
            EditingAssigned => &[EditingInProgress, Cancelled],
            EditingInProgress => &[FinalReview, Cancelled],
            FinalReview => &[Completed, EditingInProgress, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Created => "CREATED",
            ResearchInProgress => "RESEARCH_IN_PROGRESS",
            ResearchComplete => "RESEARCH_COMPLETE",
            ScriptInProgress => "SCRIPT_IN_PROGRESS",
            ScriptPendingApproval => "SCRIPT_PENDING_APPROVAL",
            ScriptApproved => "SCRIPT_APPROVED",
            ProductionInProgress => "PRODUCTION_IN_PROGRESS",
            ProductionPendingApproval => "PRODUCTION_PENDING_APPROVAL",
            ProductionApproved => "PRODUCTION_APPROVED",
            EditingAssigned => "EDITING_ASSIGNED",
            EditingInProgress => "EDITING_IN_PROGRESS",
            FinalReview => "FINAL_REVIEW",
            Completed => "COMPLETED",
            Cancelled => "CANCELLED",
        }
    }

    /// Human readable label shown in dashboards and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Created => "Created",
            ResearchInProgress => "Researching",
            ResearchComplete => "Research Complete",
            ScriptInProgress => "Writing Script",
            ScriptPendingApproval => "Script Pending Approval",
            ScriptApproved => "Script Approved",
            ProductionInProgress => "Generating Video",
            ProductionPendingApproval => "Video Pending Approval",
            ProductionApproved => "Video Approved",
            EditingAssigned => "Assigned to Editor",
            EditingInProgress => "Editing",
            FinalReview => "Final Review",
            Completed => "Completed",
            Cancelled => "Cancelled",
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            Created => StatusColor::Gray,
            ResearchInProgress | ScriptInProgress | ProductionInProgress => StatusColor::Blue,
            ResearchComplete | ScriptApproved | ProductionApproved => StatusColor::Purple,
            ScriptPendingApproval | ProductionPendingApproval | FinalReview => StatusColor::Yellow,
            EditingAssigned | EditingInProgress => StatusColor::Orange,
            Completed => StatusColor::Green,
            Cancelled => StatusColor::Red,
        }
    }

    /// Rough completion percentage for progress bars.
    pub fn progress(self) -> u8 {
        match self {
            Created => 0,
            ResearchInProgress => 10,
            ResearchComplete => 20,
            ScriptInProgress => 30,
            ScriptPendingApproval => 40,
            ScriptApproved => 50,
            ProductionInProgress => 60,
            ProductionPendingApproval => 70,
            ProductionApproved => 75,
            EditingAssigned => 80,
            EditingInProgress => 85,
            FinalReview => 95,
            Completed => 100,
            Cancelled => 0,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Completed | Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Waiting on an admin review.
    pub fn requires_admin_action(self) -> bool {
        matches!(
            self,
            ScriptPendingApproval | ProductionPendingApproval | FinalReview
        )
    }

    /// Waiting on an external automation workflow.
    pub fn is_processing(self) -> bool {
        matches!(
            self,
            ResearchInProgress | ScriptInProgress | ProductionInProgress
        )
    }

    pub fn is_editor_active(self) -> bool {
        matches!(self, EditingAssigned | EditingInProgress)
    }

    pub const ACTIVE: &'static [ProjectStatus] = &[
        Created,
        ResearchInProgress,
        ResearchComplete,
        ScriptInProgress,
        ScriptPendingApproval,
        ScriptApproved,
        ProductionInProgress,
        ProductionPendingApproval,
        ProductionApproved,
        EditingAssigned,
        EditingInProgress,
        FinalReview,
    ];
    pub const REQUIRES_ADMIN_ACTION: &'static [ProjectStatus] =
        &[ScriptPendingApproval, ProductionPendingApproval, FinalReview];
    pub const PROCESSING: &'static [ProjectStatus] =
        &[ResearchInProgress, ScriptInProgress, ProductionInProgress];
    pub const EDITOR_ACTIVE: &'static [ProjectStatus] = &[EditingAssigned, EditingInProgress];
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid project status: {}", s))
    }
}

/// Tailwind color suffix used for status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Gray,
    Blue,
    Purple,
    Yellow,
    Orange,
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Project is in terminal state '{}' and cannot be changed.", .from.label())]
    Terminal { from: ProjectStatus },

    #[error(
        "Cannot transition from '{}' to '{}'. Valid next statuses: {}",
        .from.label(),
        .to.label(),
        labels(.from.transitions())
    )]
    NotAllowed {
        from: ProjectStatus,
        to: ProjectStatus,
    },
}

fn labels(statuses: &[ProjectStatus]) -> String {
    statuses
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn is_valid_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    from.transitions().contains(&to)
}

pub fn next_valid_statuses(current: ProjectStatus) -> Vec<ProjectStatus> {
    current.transitions().to_vec()
}

pub fn can_cancel(current: ProjectStatus) -> bool {
    is_valid_transition(current, Cancelled)
}

pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), TransitionError> {
    if is_valid_transition(from, to) {
        Ok(())
    } else if from.transitions().is_empty() {
        Err(TransitionError::Terminal { from })
    } else {
        Err(TransitionError::NotAllowed { from, to })
    }
}

/// Everything a UI needs to render one status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub status: ProjectStatus,
    pub label: &'static str,
    pub color: StatusColor,
    pub progress: u8,
    pub is_terminal: bool,
    pub requires_admin_action: bool,
    pub is_processing: bool,
    pub is_editor_active: bool,
    pub next_statuses: Vec<ProjectStatus>,
}

impl From<ProjectStatus> for StatusInfo {
    fn from(status: ProjectStatus) -> Self {
        Self {
            status,
            label: status.label(),
            color: status.color(),
            progress: status.progress(),
            is_terminal: status.is_terminal(),
            requires_admin_action: status.requires_admin_action(),
            is_processing: status.is_processing(),
            is_editor_active: status.is_editor_active(),
            next_statuses: next_valid_statuses(status),
        }
    }
}

pub fn status_catalog() -> Vec<StatusInfo> {
    ProjectStatus::ALL.into_iter().map(StatusInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_legal() {
        let path = [
            Created,
            ResearchInProgress,
            ResearchComplete,
            ScriptInProgress,
            ScriptPendingApproval,
            ScriptApproved,
            ProductionInProgress,
            ProductionPendingApproval,
            EditingAssigned,
            EditingInProgress,
            FinalReview,
            Completed,
        ];

        for pair in path.windows(2) {
            assert!(
                is_valid_transition(pair[0], pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_skipping_steps_is_rejected() {
        assert!(!is_valid_transition(Created, Completed));
        assert!(!is_valid_transition(Created, ScriptInProgress));
        assert!(!is_valid_transition(ScriptApproved, EditingAssigned));
        assert!(!is_valid_transition(FinalReview, FinalReview));
    }

    #[test]
    fn test_rejection_loops() {
        assert!(is_valid_transition(ScriptPendingApproval, ScriptInProgress));
        assert!(is_valid_transition(ProductionPendingApproval, ProductionInProgress));
        assert!(is_valid_transition(FinalReview, EditingInProgress));
    }

    #[test]
    fn test_every_active_status_can_cancel() {
        for status in ProjectStatus::ALL {
            assert_eq!(can_cancel(status), status.is_active(), "{}", status);
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for status in [Completed, Cancelled] {
            assert!(status.is_terminal());
            assert!(next_valid_statuses(status).is_empty());
            for target in ProjectStatus::ALL {
                assert!(!is_valid_transition(status, target));
            }
        }
    }

    #[test]
    fn test_next_valid_statuses_preserves_order() {
        assert_eq!(
            next_valid_statuses(ProductionPendingApproval),
            vec![
                ProductionApproved,
                EditingAssigned,
                ProductionInProgress,
                Cancelled
            ]
        );
    }

    #[test]
    fn test_transition_error_messages() {
        let err = validate_transition(Created, Completed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot transition from 'Created' to 'Completed'. Valid next statuses: Researching, Cancelled"
        );

        let err = validate_transition(Completed, Created).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Project is in terminal state 'Completed' and cannot be changed."
        );

        assert!(validate_transition(FinalReview, Completed).is_ok());
    }

    #[test]
    fn test_categories() {
        for status in ProjectStatus::ALL {
            assert_eq!(
                status.requires_admin_action(),
                ProjectStatus::REQUIRES_ADMIN_ACTION.contains(&status)
            );
            assert_eq!(status.is_processing(), ProjectStatus::PROCESSING.contains(&status));
            assert_eq!(
                status.is_editor_active(),
                ProjectStatus::EDITOR_ACTIVE.contains(&status)
            );
            assert_eq!(status.is_active(), ProjectStatus::ACTIVE.contains(&status));
        }
    }

    #[test]
    fn test_labels_colors_progress() {
        assert_eq!(ProductionInProgress.label(), "Generating Video");
        assert_eq!(EditingAssigned.label(), "Assigned to Editor");
        assert_eq!(Created.color(), StatusColor::Gray);
        assert_eq!(ScriptApproved.color(), StatusColor::Purple);
        assert_eq!(FinalReview.color(), StatusColor::Yellow);
        assert_eq!(EditingInProgress.color(), StatusColor::Orange);
        assert_eq!(ProductionApproved.progress(), 75);
        assert_eq!(FinalReview.progress(), 95);
        assert_eq!(Cancelled.progress(), 0);
    }

    #[test]
    fn test_serde_and_from_str_agree() {
        for status in ProjectStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_catalog_covers_every_status() {
        let catalog = status_catalog();
        assert_eq!(catalog.len(), 14);
        let created = &catalog[0];
        assert_eq!(created.label, "Created");
        assert_eq!(created.next_statuses, vec![ResearchInProgress, Cancelled]);
    }
}
