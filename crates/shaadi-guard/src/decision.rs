//! The guard decision: what to show for a protected page.

use shaadi_session::{ErrorKind, Session, SessionStatus};

use crate::RoleSet;

/// What the app should do with a navigation to a protected page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Show the page.
    Render,
    /// A session call is in flight; show a spinner and decide again when
    /// it settles.
    ShowLoading,
    /// Session recovery failed. Show `reason` briefly, then follow up with
    /// [`Decision::RedirectToLogin`] (see [`Decision::follow_up`]).
    ShowError {
        kind: Option<ErrorKind>,
        reason: String,
    },
    /// Nobody is logged in.
    RedirectToLogin,
    /// Logged in, but the role isn't allowed here.
    RedirectToHome,
}

impl Decision {
    /// The decision to apply once a transient one has been shown.
    ///
    /// Only [`ShowError`](Self::ShowError) has one.
    pub fn follow_up(&self) -> Option<Decision> {
        match self {
            Self::ShowError { .. } => Some(Self::RedirectToLogin),
            _ => None,
        }
    }

    /// `true` for decisions that navigate away from the requested page.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectToLogin | Self::RedirectToHome)
    }
}

const FALLBACK_REASON: &str = "Your session could not be restored";

/// Decides what to show for a protected page.
///
/// `required` is the set of roles allowed on the page; `None` means any
/// logged-in user. The checks run in this order, first match wins:
///
/// 1. a call is in flight → [`Decision::ShowLoading`]
/// 2. recovery failed → [`Decision::ShowError`]
/// 3. nobody logged in → [`Decision::RedirectToLogin`]
/// 4. role not in `required` → [`Decision::RedirectToHome`]
/// 5. otherwise → [`Decision::Render`]
pub fn decide(session: &Session, required: Option<RoleSet>) -> Decision {
    if session.status == SessionStatus::Loading {
        return Decision::ShowLoading;
    }
    if session.status == SessionStatus::Failed {
        let (kind, reason) = match &session.last_error {
            Some(error) => (Some(error.kind), error.message.clone()),
            None => (None, FALLBACK_REASON.to_owned()),
        };
        return Decision::ShowError { kind, reason };
    }
    let Some(identity) = &session.identity else {
        return Decision::RedirectToLogin;
    };
    match required {
        Some(roles) if !roles.contains(identity.role) => Decision::RedirectToHome,
        _ => Decision::Render,
    }
}

#[cfg(test)]
mod tests {
    use shaadi_protocol::{Identity, Role, UserId};
    use shaadi_session::ErrorInfo;

    use super::*;

    fn ready_as(role: Role) -> Session {
        Session::signed_in(Identity {
            id: UserId::new("u1"),
            display_name: "Meera".into(),
            role,
            email: "meera@example.com".into(),
        })
    }

    #[test]
    fn test_vendor_on_admin_page_goes_home() {
        let session = ready_as(Role::Vendor);
        assert_eq!(
            decide(&session, Some(RoleSet::only(Role::Admin))),
            Decision::RedirectToHome
        );
    }

    #[test]
    fn test_vendor_on_vendor_page_renders() {
        let session = ready_as(Role::Vendor);
        assert_eq!(
            decide(&session, Some(RoleSet::only(Role::Vendor))),
            Decision::Render
        );
    }

    #[test]
    fn test_no_requirement_admits_any_role() {
        for role in Role::ALL {
            assert_eq!(decide(&ready_as(role), None), Decision::Render);
        }
    }

    #[test]
    fn test_empty_requirement_admits_no_one() {
        for role in Role::ALL {
            assert_eq!(
                decide(&ready_as(role), Some(RoleSet::EMPTY)),
                Decision::RedirectToHome
            );
        }
    }

    #[test]
    fn test_loading_wins_over_everything() {
        let with_identity = Session {
            status: SessionStatus::Loading,
            ..ready_as(Role::Admin)
        };
        let without = Session {
            status: SessionStatus::Loading,
            ..Session::default()
        };
        for session in [with_identity, without] {
            assert_eq!(decide(&session, None), Decision::ShowLoading);
            assert_eq!(
                decide(&session, Some(RoleSet::EMPTY)),
                Decision::ShowLoading
            );
        }
    }

    #[test]
    fn test_failed_shows_reason_then_login() {
        let session =
            Session::failed(ErrorInfo::new(ErrorKind::AuthExpired, "Token is not valid"));

        let decision = decide(&session, None);

        assert_eq!(
            decision,
            Decision::ShowError {
                kind: Some(ErrorKind::AuthExpired),
                reason: "Token is not valid".into(),
            }
        );
        assert_eq!(decision.follow_up(), Some(Decision::RedirectToLogin));
    }

    #[test]
    fn test_failed_without_error_uses_fallback_reason() {
        let session = Session {
            status: SessionStatus::Failed,
            ..Session::default()
        };
        assert!(matches!(
            decide(&session, None),
            Decision::ShowError { kind: None, ref reason } if reason == FALLBACK_REASON
        ));
    }

    #[test]
    fn test_signed_out_goes_to_login() {
        let decision = decide(&Session::signed_out(), Some(RoleSet::ALL));
        assert_eq!(decision, Decision::RedirectToLogin);
        assert!(decision.is_redirect());
        assert_eq!(decision.follow_up(), None);
    }
}
