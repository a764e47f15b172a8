use super::AccessError;
use crate::auth::Identity;
use crate::database::models::Ticket;

/// A resource with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Ticket {
    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

/// Read/mutate gate applied after the target resource is loaded.
///
/// Staff pass for any resource. A `User` passes only for resources they own.
/// Denial is `Forbidden` even though it tells the caller the resource exists.
pub fn authorize<R: Owned>(identity: &Identity, resource: &R) -> Result<(), AccessError> {
    if identity.is_staff() || resource.owner_id() == identity.user_id {
        return Ok(());
    }

    tracing::debug!(
        user_id = identity.user_id,
        role = %identity.role,
        owner_id = resource.owner_id(),
        "resource access denied"
    );
    Err(AccessError::NotOwner)
}

/// Owner filter for listings: staff see everything, users see their own.
pub fn owner_scope(identity: &Identity) -> Option<i64> {
    if identity.is_staff() {
        None
    } else {
        Some(identity.user_id)
    }
}
