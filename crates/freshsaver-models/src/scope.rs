//! Visibility scopes.
//!
//! Categories, product types and recipes carry a `user_id` that is either
//! the literal `"global"` (visible to everyone) or the id of the owning user.

/// Scope tag for entities shared by all users.
pub const GLOBAL_SCOPE: &str = "global";

/// Scopes a caller may read: always `"global"`, plus the caller's own id
/// when authenticated.
pub fn visible_scopes(user_id: Option<&str>) -> Vec<String> {
    let mut scopes = vec![GLOBAL_SCOPE.to_string()];
    if let Some(uid) = user_id {
        if uid != GLOBAL_SCOPE {
            scopes.push(uid.to_string());
        }
    }
    scopes
}

/// Whether an entity with the given scope is visible to the caller.
pub fn is_visible(scope: &str, user_id: Option<&str>) -> bool {
    scope == GLOBAL_SCOPE || user_id.is_some_and(|uid| uid == scope)
}
