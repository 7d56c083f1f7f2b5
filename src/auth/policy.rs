use crate::error::ApiError;
use crate::users::repo_types::{Role, User};

/// Administrative actions subject to role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListUsers,
    GetUser,
    UpdateUser,
    DeleteUser,
    SendBulkMail,
}

struct Rule {
    action: Action,
    roles: &'static [Role],
    require_verified: bool,
}

/// Single policy table consulted by every gated handler. Role checks live
/// here instead of being scattered across handlers.
const RULES: &[Rule] = &[
    Rule {
        action: Action::ListUsers,
        roles: &[Role::Admin, Role::Moderator],
        require_verified: false,
    },
    Rule {
        action: Action::GetUser,
        roles: &[Role::Admin, Role::Moderator],
        require_verified: false,
    },
    Rule {
        action: Action::UpdateUser,
        roles: &[Role::Admin, Role::Moderator],
        require_verified: false,
    },
    Rule {
        action: Action::DeleteUser,
        roles: &[Role::Admin],
        require_verified: false,
    },
    Rule {
        action: Action::SendBulkMail,
        roles: &[Role::Admin],
        require_verified: false,
    },
];

fn forbidden() -> ApiError {
    ApiError::Forbidden("Forbidden: You do not have permission to access this resource".into())
}

pub fn authorize(actor: &User, action: Action) -> Result<(), ApiError> {
    let rule = RULES
        .iter()
        .find(|r| r.action == action)
        .ok_or_else(forbidden)?;
    if !rule.roles.contains(&actor.role) {
        return Err(forbidden());
    }
    if rule.require_verified && !actor.is_verified {
        return Err(forbidden());
    }
    Ok(())
}

/// Extra predicate for deletion: removing an admin account requires a
/// verified actor.
pub fn authorize_delete(actor: &User, target: &User) -> Result<(), ApiError> {
    authorize(actor, Action::DeleteUser)?;
    if target.role == Role::Admin && !actor.is_verified {
        return Err(forbidden());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_users_cannot_reach_admin_actions() {
        let user = User::stub(Role::User, true);
        for action in [
            Action::ListUsers,
            Action::GetUser,
            Action::UpdateUser,
            Action::DeleteUser,
            Action::SendBulkMail,
        ] {
            assert!(authorize(&user, action).is_err());
        }
    }

    #[test]
    fn moderators_manage_users_but_cannot_delete() {
        let moderator = User::stub(Role::Moderator, true);
        assert!(authorize(&moderator, Action::ListUsers).is_ok());
        assert!(authorize(&moderator, Action::UpdateUser).is_ok());
        assert!(authorize(&moderator, Action::DeleteUser).is_err());
        assert!(authorize(&moderator, Action::SendBulkMail).is_err());
    }

    #[test]
    fn admins_pass_every_action() {
        let admin = User::stub(Role::Admin, true);
        for action in [
            Action::ListUsers,
            Action::GetUser,
            Action::UpdateUser,
            Action::DeleteUser,
            Action::SendBulkMail,
        ] {
            assert!(authorize(&admin, action).is_ok());
        }
    }

    #[test]
    fn unverified_admin_cannot_delete_another_admin() {
        let actor = User::stub(Role::Admin, false);
        let target_admin = User::stub(Role::Admin, true);
        let target_user = User::stub(Role::User, true);
        assert!(authorize_delete(&actor, &target_admin).is_err());
        assert!(authorize_delete(&actor, &target_user).is_ok());
    }

    #[test]
    fn verified_admin_may_delete_an_admin() {
        let actor = User::stub(Role::Admin, true);
        let target = User::stub(Role::Admin, false);
        assert!(authorize_delete(&actor, &target).is_ok());
    }
}
