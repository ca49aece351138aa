use super::Capability;
use crate::common::entity_ids::UserId;
use crate::common::errors::AppError;
use crate::domains::users::UserRole;

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(user_id, role)
///     .can(Capability::ReviewProjects)
///     .check()?;
///
/// Actor::new(user_id, role)
///     .can(Capability::WorkOnProject)
///     .on_project(project.editor_id)
///     .check()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    user_id: UserId,
    role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
            assigned_editor: None,
        }
    }

    /// Admins see every project; editors only the ones assigned to them.
    pub fn can_view_project(&self, editor_id: Option<UserId>) -> bool {
        self.is_admin() || editor_id == Some(self.user_id)
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
    assigned_editor: Option<UserId>,
}

impl CapabilityBuilder {
    /// Scope the check to a project's assigned editor.
    pub fn on_project(mut self, editor_id: Option<UserId>) -> Self {
        self.assigned_editor = editor_id;
        self
    }

    /// Perform the authorization check
    pub fn check(self) -> Result<(), AppError> {
        if self.actor.is_admin() {
            return Ok(());
        }

        if self.capability.requires_admin() {
            return Err(AppError::AdminRequired);
        }

        if self.assigned_editor == Some(self.actor.user_id) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(
                "only the assigned editor can work on this project".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_capability() {
        let admin = Actor::new(UserId::new(), UserRole::Admin);
        for capability in [
            Capability::ManageClients,
            Capability::ManageUsers,
            Capability::ManageWebhooks,
            Capability::ReviewProjects,
            Capability::WorkOnProject,
        ] {
            assert!(admin.can(capability).check().is_ok());
        }
    }

    #[test]
    fn editor_is_rejected_for_admin_capabilities() {
        let editor = Actor::new(UserId::new(), UserRole::Editor);
        let result = editor.can(Capability::ReviewProjects).check();
        assert!(matches!(result, Err(AppError::AdminRequired)));
    }

    #[test]
    fn assigned_editor_can_work_on_project() {
        let editor_id = UserId::new();
        let editor = Actor::new(editor_id, UserRole::Editor);

        assert!(editor
            .can(Capability::WorkOnProject)
            .on_project(Some(editor_id))
            .check()
            .is_ok());
    }

    #[test]
    fn other_editor_cannot_work_on_project() {
        let editor = Actor::new(UserId::new(), UserRole::Editor);

        let result = editor
            .can(Capability::WorkOnProject)
            .on_project(Some(UserId::new()))
            .check();
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));

        let unassigned = editor.can(Capability::WorkOnProject).on_project(None).check();
        assert!(matches!(unassigned, Err(AppError::PermissionDenied(_))));
    }

    #[test]
    fn project_visibility() {
        let editor_id = UserId::new();
        let editor = Actor::new(editor_id, UserRole::Editor);
        assert!(editor.can_view_project(Some(editor_id)));
        assert!(!editor.can_view_project(None));
        assert!(Actor::new(UserId::new(), UserRole::Admin).can_view_project(None));
    }
}
