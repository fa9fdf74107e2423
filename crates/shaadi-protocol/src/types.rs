//! Core protocol types for the auth API's wire format.
//!
//! Every type here is a JSON body that travels between the client and the
//! marketplace backend: what we send to `login`/`register`, and what comes
//! back from them and from the identity-verification endpoint.
//!
//! The backend is not part of this repository, so the types are lenient
//! where the backend has historically been inconsistent (`_id` vs `id`,
//! `user` vs `identity`) and strict where it matters for authorization
//! (roles are a closed set; unknown roles fail to decode).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The backend's identifier for a user account.
///
/// A "newtype wrapper" around the backend's string id: a `UserId` can't be
/// confused with an email or a token even though all three are strings.
/// `#[serde(transparent)]` keeps it a bare string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw backend id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of account a user has.
///
/// This is a closed set: the marketplace has exactly three kinds of users.
/// Modelling it as an enum (instead of comparing role strings all over the
/// UI) means a typo like `"vendr"` is a compile error in our code and a
/// decode error when it comes from the backend.
///
/// `#[serde(rename_all = "lowercase")]` matches the backend's spelling:
/// `"customer"`, `"vendor"`, `"admin"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A couple (or their family) browsing vendors and making bookings.
    /// New registrations get this role unless they ask otherwise.
    #[default]
    Customer,

    /// A wedding vendor (photographer, caterer, venue...) managing their
    /// listing and incoming bookings.
    Vendor,

    /// Marketplace staff with access to the admin dashboards.
    Admin,
}

impl Role {
    /// Every role, in a stable order.
    pub const ALL: [Role; 3] = [Role::Customer, Role::Vendor, Role::Admin];

    /// The wire spelling of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    /// Parses a role name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ProtocolError::InvalidMessage(format!("unknown role: {trimmed:?}"))
            })
    }
}

/// The authenticated user's profile, as far as authorization cares.
///
/// Returned by the verification endpoint and inside every [`AuthGrant`].
/// Decoding accepts either spelling of `id` and `name`, or both at once
/// (Mongoose sends `_id` alongside the `id` virtual).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub struct Identity {
    /// Backend account id. Older endpoints spell it `_id`.
    pub id: UserId,

    /// Name shown in the header ("Namaste, Asha").
    #[serde(rename = "name")]
    pub display_name: String,

    /// Which dashboards this user may see.
    pub role: Role,

    /// Login email.
    pub email: String,
}

/// [`Identity`] as the backend may send it. `id` wins over `_id` and
/// `name` over `displayName` when both are present.
#[derive(Deserialize)]
struct RawIdentity {
    id: Option<UserId>,
    #[serde(rename = "_id")]
    legacy_id: Option<UserId>,
    name: Option<String>,
    #[serde(rename = "displayName")]
    legacy_name: Option<String>,
    role: Role,
    email: String,
}

impl TryFrom<RawIdentity> for Identity {
    type Error = ProtocolError;

    fn try_from(raw: RawIdentity) -> Result<Self, Self::Error> {
        let missing =
            |field: &str| ProtocolError::InvalidMessage(format!("missing field `{field}`"));
        Ok(Self {
            id: raw.id.or(raw.legacy_id).ok_or_else(|| missing("id"))?,
            display_name: raw.name.or(raw.legacy_name).ok_or_else(|| missing("name"))?,
            role: raw.role,
            email: raw.email,
        })
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of the login request: `{ "email": ..., "password": ... }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Builds credentials, trimming whitespace around the email.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_owned(),
            password: password.into(),
        }
    }

    /// Returns `true` if either field is empty, which the backend would
    /// reject anyway.
    pub fn is_incomplete(&self) -> bool {
        self.email.is_empty() || self.password.is_empty()
    }
}

// Hand-written so passwords never end up in logs via `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of the registration request.
///
/// Registration doubles as login: a successful response carries the same
/// [`AuthGrant`] as `login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationProfile {
    pub name: String,
    pub email: String,
    pub password: String,

    /// Requested account kind. Defaults to [`Role::Customer`].
    #[serde(default)]
    pub role: Role,

    /// Optional contact number, mostly filled in by vendors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegistrationProfile {
    /// A customer registration with the three required fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            email: email.into().trim().to_owned(),
            password: password.into(),
            role: Role::Customer,
            phone: None,
        }
    }

    /// Requests a different account kind (e.g. a vendor signing up).
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Attaches a contact number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Checks the fields the backend would certainly reject.
    ///
    /// This is a courtesy check, not the authority: the backend still
    /// validates (duplicate emails, password policy, ...).
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidMessage("name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(ProtocolError::InvalidMessage(
                "email must contain '@'".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "password is required".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for RegistrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationProfile")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("phone", &self.phone)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful login/registration response: a bearer token plus the
/// identity it belongs to.
///
/// The backend calls the identity `user`; we accept both spellings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    #[serde(alias = "user")]
    pub identity: Identity,
}

impl AuthGrant {
    /// Rejects grants that decoded fine but can't be used.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the token is blank.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.token.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "grant carries an empty token".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Body of the identity-verification response.
///
/// Some deployments return the identity directly, others wrap it as
/// `{ "user": {...} }`. `#[serde(untagged)]` tries each shape in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityResponse {
    Wrapped { user: Identity },
    Bare(Identity),
}

impl IdentityResponse {
    /// Unwraps whichever shape the backend sent.
    pub fn into_identity(self) -> Identity {
        match self {
            Self::Wrapped { user } => user,
            Self::Bare(identity) => identity,
        }
    }
}

/// Error body returned by the backend on non-2xx responses.
///
/// Express-style backends use `message`; some middleware uses `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The human-readable reason, preferring `message` over `error`.
    /// Blank strings count as absent.
    pub fn reason(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    fn identity_json() -> &'static str {
        r#"{"_id":"64f0","displayName":"Ravi","role":"admin","email":"ravi@example.com"}"#
    }

    #[test]
    fn test_identity_accepts_legacy_field_names() {
        let identity: Identity = serde_json::from_str(identity_json()).unwrap();

        assert_eq!(identity.id, UserId::new("64f0"));
        assert_eq!(identity.display_name, "Ravi");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_identity_accepts_both_spellings_at_once() {
        let json = r#"{"_id":"abc","id":"abc","name":"A","displayName":"A","role":"vendor","email":"a@b.com"}"#;

        let identity: Identity = serde_json::from_str(json).unwrap();

        assert_eq!(identity.id, UserId::new("abc"));
        assert_eq!(identity.display_name, "A");
        assert_eq!(identity.role, Role::Vendor);
    }

    #[test]
    fn test_identity_prefers_current_field_names() {
        let json = r#"{"_id":"old","id":"new","name":"Asha","displayName":"asha_k","role":"customer","email":"a@b.com"}"#;

        let identity: Identity = serde_json::from_str(json).unwrap();

        assert_eq!(identity.id, UserId::new("new"));
        assert_eq!(identity.display_name, "Asha");
    }

    #[test]
    fn test_identity_requires_an_id() {
        let json = r#"{"name":"A","role":"vendor","email":"a@b.com"}"#;

        let err = serde_json::from_str::<Identity>(json).unwrap_err();

        assert!(err.to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_identity_round_trips_with_current_names() {
        let identity: Identity = serde_json::from_str(identity_json()).unwrap();

        let json = serde_json::to_value(&identity).unwrap();

        assert_eq!(json["id"], "64f0");
        assert_eq!(json["name"], "Ravi");
        assert!(json.get("_id").is_none());
        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_identity_response_wrapped_with_both_ids() {
        let json = r#"{"user":{"_id":"abc","id":"abc","name":"A","role":"admin","email":"a@b.com"}}"#;

        let response: IdentityResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.into_identity().id, UserId::new("abc"));
    }

    #[test]
    fn test_identity_rejects_unknown_role() {
        let json = r#"{"id":"1","name":"X","role":"superuser","email":"x@y.z"}"#;

        let result: Result<Identity, _> = serde_json::from_str(json);

        assert!(result.is_err(), "roles outside the closed set must not decode");
    }

    #[test]
    fn test_role_from_str_ignores_case_and_whitespace() {
        assert_eq!(" Vendor ".parse::<Role>().unwrap(), Role::Vendor);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!(
            "planner".parse::<Role>(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_role_display_matches_wire_spelling() {
        for role in Role::ALL {
            let wire = serde_json::to_string(&role).unwrap();
            assert_eq!(wire, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_auth_grant_accepts_user_alias() {
        let json = format!(r#"{{"token":"abc","user":{}}}"#, identity_json());

        let grant: AuthGrant = serde_json::from_str(&json).unwrap();

        assert_eq!(grant.token, "abc");
        assert_eq!(grant.identity.display_name, "Ravi");
        assert!(grant.validate().is_ok());
    }

    #[test]
    fn test_auth_grant_with_blank_token_is_invalid() {
        let json = format!(r#"{{"token":"  ","identity":{}}}"#, identity_json());
        let grant: AuthGrant = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            grant.validate(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_identity_response_handles_both_shapes() {
        let bare: IdentityResponse = serde_json::from_str(identity_json()).unwrap();
        let wrapped: IdentityResponse =
            serde_json::from_str(&format!(r#"{{"user":{}}}"#, identity_json()))
                .unwrap();

        assert_eq!(bare.into_identity(), wrapped.into_identity());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let creds = Credentials::new("a@b.com", "s3cret");
        let profile = RegistrationProfile::new("A", "a@b.com", "s3cret");

        assert!(!format!("{creds:?}").contains("s3cret"));
        assert!(!format!("{profile:?}").contains("s3cret"));
    }

    #[test]
    fn test_credentials_trim_email_and_detect_missing_fields() {
        let creds = Credentials::new("  a@b.com ", "pw");
        assert_eq!(creds.email, "a@b.com");
        assert!(!creds.is_incomplete());

        assert!(Credentials::new("   ", "pw").is_incomplete());
        assert!(Credentials::new("a@b.com", "").is_incomplete());
    }

    #[test]
    fn test_registration_profile_validation() {
        assert!(RegistrationProfile::new("A", "a@b.com", "x").validate().is_ok());
        assert!(RegistrationProfile::new("", "a@b.com", "x").validate().is_err());
        assert!(RegistrationProfile::new("A", "not-an-email", "x")
            .validate()
            .is_err());
        assert!(RegistrationProfile::new("A", "a@b.com", "").validate().is_err());
    }

    #[test]
    fn test_registration_profile_defaults_to_customer_on_the_wire() {
        let json = r#"{"name":"A","email":"a@b.com","password":"x"}"#;

        let profile: RegistrationProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.role, Role::Customer);
        assert_eq!(profile.phone, None);
        let out = serde_json::to_value(&profile.with_role(Role::Vendor)).unwrap();
        assert_eq!(out["role"], "vendor");
        assert!(out.get("phone").is_none());
    }

    #[test]
    fn test_api_error_body_prefers_message_and_skips_blanks() {
        let body = ApiErrorBody {
            message: Some("  ".into()),
            error: Some("Invalid credentials".into()),
        };
        assert_eq!(body.reason(), Some("Invalid credentials"));

        let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.reason(), None);
    }
}
