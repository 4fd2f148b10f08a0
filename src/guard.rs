use uuid::Uuid;

use crate::{auth::AuthUser, errors::ApiError, models::Role};

/// Access
///
/// Who may perform one verb on one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, including anonymous callers.
    Public,
    /// Any authenticated caller.
    Authenticated,
    /// Authenticated callers with the admin role.
    Admin,
    /// The resource's owner, or an admin.
    OwnerOrAdmin,
}

/// can_mutate
///
/// True iff the caller is an admin or owns the resource. A resource without an
/// owner can only be mutated by an admin under this rule.
pub fn can_mutate(caller_id: Uuid, caller_role: Role, owner_id: Option<Uuid>) -> bool {
    caller_role == Role::Admin || owner_id == Some(caller_id)
}

/// Gate applied before the store is touched.
///
/// Missing identity is 401 for every non-public verb; a non-admin on an
/// admin-only verb is 403. Ownership is checked later, once the resource is loaded.
pub fn authorize_caller(access: Access, caller: Option<&AuthUser>) -> Result<(), ApiError> {
    match (access, caller) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(ApiError::Unauthorized),
        (Access::Admin, Some(user)) if !user.is_admin() => Err(ApiError::Forbidden),
        _ => Ok(()),
    }
}

/// Gate applied after the resource has been loaded.
pub fn authorize_owner(
    access: Access,
    caller: Option<&AuthUser>,
    owner_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if access != Access::OwnerOrAdmin {
        return Ok(());
    }
    let user = caller.ok_or(ApiError::Unauthorized)?;
    if can_mutate(user.id, user.role, owner_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
