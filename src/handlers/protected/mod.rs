// Endpoints behind the JWT middleware. Every handler here can rely on a
// `Caller` in the request extensions.
pub mod activities;
pub mod me;
pub mod profiles;
pub mod users;

use crate::auth::{Admin, Caller};
use crate::error::ApiError;

/// Admin capability of the caller, or 403
pub(crate) fn require_admin(caller: &Caller) -> Result<Admin, ApiError> {
    caller
        .admin()
        .ok_or_else(|| ApiError::forbidden("Admin privileges required"))
}
