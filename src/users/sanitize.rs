use crate::users::dto::PublicUser;
use crate::users::repo::User;
use crate::users::ROLE_ADMIN;

/// Projects a stored user into the view a given caller is allowed to see.
///
/// The password hash never crosses this boundary for any caller. An admin,
/// or the user looking at their own profile, keeps email and names; every
/// other viewer gets only the minimally identifying fields.
pub fn project(user: User, viewer_roles: &[String], is_self: bool) -> PublicUser {
    let privileged = is_self || viewer_roles.iter().any(|r| r == ROLE_ADMIN);

    PublicUser {
        id: user.id,
        username: user.username,
        email: if privileged { user.email } else { None },
        first_name: if privileged { user.first_name } else { None },
        last_name: if privileged { user.last_name } else { None },
        roles: user.roles,
        food_item_ids: user.food_item_ids,
        nutrition_log_ids: user.nutrition_log_ids,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
