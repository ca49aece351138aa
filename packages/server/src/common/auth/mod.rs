/// Authorization for admin and editor actions
///
/// Provides a fluent API for authorization checks in domain actions:
///
/// ```ignore
/// use crate::common::auth::{Actor, Capability};
///
/// Actor::new(user_id, role)
///     .can(Capability::ManageClients)
///     .check()?;
/// ```
///
/// Authentication (turning a bearer token into an `Actor`) lives in the server middleware.

mod builder;
mod capability;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::Capability;
