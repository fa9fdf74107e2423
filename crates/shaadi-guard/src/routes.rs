//! Path patterns and the access rule attached to each.
//!
//! Patterns are `/`-separated segments; a segment starting with `:` is a
//! parameter that matches any single non-empty segment:
//!
//! ```text
//! /vendors/:id   matches  /vendors/42, /vendors/royal-caterers
//!                not      /vendors, /vendors/42/reviews
//! ```
//!
//! When several patterns match, the one with more literal segments wins
//! (`/vendors/featured` beats `/vendors/:id`), then the one added first.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use shaadi_protocol::{Codec, JsonCodec, Role};
use shaadi_session::Session;

use crate::{decide, Decision, RoleSet, RouteError};

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, logged in or not. Never guarded.
    Public,
    /// Requires a session; `roles: None` means any role.
    Protected { roles: Option<RoleSet> },
}

impl Access {
    /// Any logged-in user.
    pub const AUTHENTICATED: Self = Self::Protected { roles: None };

    /// Logged-in users whose role is in `roles`.
    pub const fn roles(roles: RoleSet) -> Self {
        Self::Protected { roles: Some(roles) }
    }

    /// Runs the guard for this rule.
    pub fn decide(&self, session: &Session) -> Decision {
        match self {
            Self::Public => Decision::Render,
            Self::Protected { roles } => decide(session, *roles),
        }
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_owned(),
            reason: reason.to_owned(),
        };

        let rest = raw.strip_prefix('/').ok_or_else(|| invalid("must start with '/'"))?;
        let mut segments = Vec::new();
        if !rest.is_empty() {
            let rest = rest.strip_suffix('/').unwrap_or(rest);
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                match part.strip_prefix(':') {
                    Some("") => return Err(invalid("parameter without a name")),
                    Some(name) => segments.push(Segment::Param(name.to_owned())),
                    None => segments.push(Segment::Literal(part.to_owned())),
                }
            }
        }
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// Two patterns are the same route if they differ only in parameter
    /// names.
    fn same_shape(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|pair| match pair {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Param(_), Segment::Param(_)) => true,
                _ => false,
            })
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Matches `parts` and returns the captured parameters.
    fn capture(&self, parts: &[&str]) -> Option<Vec<(String, String)>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), (*part).to_owned())),
            }
        }
        Some(params)
    }
}

/// Strips query and fragment, then splits into segments. `None` if the
/// path isn't absolute or has empty segments (`//`).
fn split_path(path: &str) -> Option<Vec<&str>> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Route {
    pattern: Pattern,
    access: Access,
}

/// The outcome of resolving a path against a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The pattern as it was registered, e.g. `/vendors/:id`.
    pub pattern: &'a str,
    pub access: Access,
    /// Captured `:param` values, in pattern order.
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    /// The value captured for `:name`, if the pattern has one.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Maps path patterns to [`Access`] rules, and knows where redirects go.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    login_path: String,
    home_path: String,
}

impl Default for RouteTable {
    /// The marketplace's own routes. See [`RouteTable::shaadisetgo`].
    fn default() -> Self {
        Self::shaadisetgo()
    }
}

const BOOKINGS: RoleSet = RoleSet::of(&[Role::Customer, Role::Admin]);
const VENDOR_ONLY: RoleSet = RoleSet::only(Role::Vendor);
const ADMIN_ONLY: RoleSet = RoleSet::only(Role::Admin);

impl RouteTable {
    /// An empty table redirecting to `/login` and `/`.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            login_path: "/login".into(),
            home_path: "/".into(),
        }
    }

    /// The ShaadiSetGo web app's routes:
    ///
    /// | pattern             | access              |
    /// |---------------------|---------------------|
    /// | `/`, `/login`, `/register`, `/vendors`, `/vendors/:id` | public |
    /// | `/bookings`         | customer or admin   |
    /// | `/profile`, `/chat` | any logged-in user  |
    /// | `/vendor/dashboard` | vendor              |
    /// | `/admin/dashboard`  | admin               |
    pub fn shaadisetgo() -> Self {
        let routes = [
            ("/", Access::Public),
            ("/login", Access::Public),
            ("/register", Access::Public),
            ("/vendors", Access::Public),
            ("/vendors/:id", Access::Public),
            ("/bookings", Access::roles(BOOKINGS)),
            ("/profile", Access::AUTHENTICATED),
            ("/chat", Access::AUTHENTICATED),
            ("/vendor/dashboard", Access::roles(VENDOR_ONLY)),
            ("/admin/dashboard", Access::roles(ADMIN_ONLY)),
        ];
        let mut table = Self::new();
        for (pattern, access) in routes {
            // Patterns above are fixed and distinct.
            if let Err(e) = table.add(pattern, access) {
                tracing::error!(error = %e, "built-in route rejected");
            }
        }
        table
    }

    /// Registers a route.
    ///
    /// # Errors
    /// - [`RouteError::InvalidPattern`] if `pattern` is malformed
    /// - [`RouteError::Duplicate`] if an equivalent pattern exists
    pub fn add(&mut self, pattern: &str, access: Access) -> Result<(), RouteError> {
        let pattern = Pattern::parse(pattern)?;
        if self.routes.iter().any(|r| r.pattern.same_shape(&pattern)) {
            return Err(RouteError::Duplicate(pattern.raw));
        }
        self.routes.push(Route { pattern, access });
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    pub fn route(mut self, pattern: &str, access: Access) -> Result<Self, RouteError> {
        self.add(pattern, access)?;
        Ok(self)
    }

    /// Changes where [`Decision::RedirectToLogin`] points.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Changes where [`Decision::RedirectToHome`] points.
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Where a redirect decision sends the user, if it is one.
    pub fn redirect_target(&self, decision: &Decision) -> Option<&str> {
        match decision {
            Decision::RedirectToLogin => Some(&self.login_path),
            Decision::RedirectToHome => Some(&self.home_path),
            _ => None,
        }
    }

    /// Finds the route for `path`. Query strings, fragments, and a
    /// trailing slash are ignored.
    ///
    /// # Errors
    /// [`RouteError::NotFound`] if nothing matches.
    pub fn resolve(&self, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let not_found = || RouteError::NotFound(path.to_owned());
        let parts = split_path(path).ok_or_else(not_found)?;

        let mut best: Option<(&Route, Vec<(String, String)>)> = None;
        for route in &self.routes {
            let Some(params) = route.pattern.capture(&parts) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((current, _)) => {
                    route.pattern.literal_count() > current.pattern.literal_count()
                }
            };
            if better {
                best = Some((route, params));
            }
        }

        let (route, params) = best.ok_or_else(not_found)?;
        Ok(RouteMatch {
            pattern: &route.pattern.raw,
            access: route.access,
            params,
        })
    }

    /// Resolves `path` and runs the guard against `session`.
    pub fn decide(&self, path: &str, session: &Session) -> Result<Decision, RouteError> {
        Ok(self.resolve(path)?.access.decide(session))
    }

    // -----------------------------------------------------------------
    // Loading from JSON
    // -----------------------------------------------------------------

    /// Parses a table from JSON:
    ///
    /// ```json
    /// [
    ///   { "path": "/", "access": "public" },
    ///   { "path": "/chat", "access": "authenticated" },
    ///   { "path": "/admin/dashboard", "access": { "roles": ["admin"] } }
    /// ]
    /// ```
    ///
    /// Redirect targets stay at `/login` and `/`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RouteError> {
        let entries: Vec<RouteEntry> = JsonCodec.decode(bytes)?;
        let mut table = Self::new();
        for entry in entries {
            table.add(&entry.path, entry.access.into())?;
        }
        tracing::debug!(routes = table.len(), "route table loaded");
        Ok(table)
    }

    /// Reads and parses a JSON table file.
    pub fn load(path: &Path) -> Result<Self, RouteError> {
        let bytes = fs::read(path)?;
        Self::from_json(&bytes)
    }
}

#[derive(Deserialize)]
struct RouteEntry {
    path: String,
    access: AccessEntry,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccessEntry {
    Keyword(AccessKeyword),
    Roles { roles: RoleSet },
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum AccessKeyword {
    Public,
    Authenticated,
}

impl From<AccessEntry> for Access {
    fn from(entry: AccessEntry) -> Self {
        match entry {
            AccessEntry::Keyword(AccessKeyword::Public) => Access::Public,
            AccessEntry::Keyword(AccessKeyword::Authenticated) => Access::AUTHENTICATED,
            AccessEntry::Roles { roles } => Access::roles(roles),
        }
    }
}
