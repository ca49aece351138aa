/// Things an authenticated user may ask to do.
///
/// Admin capabilities are granted by role alone. `WorkOnProject` is also granted to the
/// editor assigned to the project in question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, edit and delete clients
    ManageClients,

    /// Create, edit and delete editor accounts
    ManageUsers,

    /// Configure, test, trigger and retry outbound webhooks
    ManageWebhooks,

    /// Create projects and approve or reject their deliverables
    ReviewProjects,

    /// Start editing and submit the final cut
    WorkOnProject,
}

impl Capability {
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Capability::WorkOnProject)
    }
}
