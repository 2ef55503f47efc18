use sqlx::PgPool;

use crate::routes::friend::model::Friend;
use crate::routes::user::model::User;

/// Whether `viewer_login` may read `target`'s profile and posts. Public
/// profiles are open to everyone; private ones only to the owner and to
/// logins the owner has added as friends.
pub fn can_view(viewer_login: &str, target_login: &str, target_is_public: bool, is_friend: bool) -> bool {
    if target_is_public {
        return true;
    }
    if viewer_login == target_login {
        return true;
    }
    is_friend
}

/// Resolves the friend edge and applies [`can_view`]. The edge direction
/// matters: the target must have added the viewer.
pub async fn check_access(
    pool: &PgPool,
    viewer_login: &str,
    target: &User,
) -> Result<bool, sqlx::Error> {
    if target.is_public || viewer_login == target.login {
        return Ok(true);
    }
    let is_friend = Friend::exists(pool, &target.login, viewer_login).await?;
    Ok(can_view(viewer_login, &target.login, target.is_public, is_friend))
}

#[cfg(test)]
mod tests {
    use super::can_view;

    #[test]
    fn public_profile_is_visible_to_anyone() {
        assert!(can_view("dave", "carol", true, false));
    }

    #[test]
    fn owner_always_sees_own_content() {
        assert!(can_view("carol", "carol", false, false));
        assert!(can_view("carol", "carol", true, false));
    }

    #[test]
    fn friend_sees_private_content() {
        assert!(can_view("dave", "carol", false, true));
    }

    #[test]
    fn stranger_is_denied_private_content() {
        assert!(!can_view("dave", "carol", false, false));
    }
}
