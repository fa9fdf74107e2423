//! Sets of roles, as a bit set.

use std::fmt;

use serde::{Deserialize, Serialize};
use shaadi_protocol::Role;

/// A set of [`Role`]s.
///
/// There are only three roles, so the set is a `u8` with one bit each.
/// All constructors are `const fn`, so page requirements can be spelled
/// as constants:
///
/// ```rust
/// use shaadi_guard::RoleSet;
/// use shaadi_protocol::Role;
///
/// const BOOKINGS: RoleSet = RoleSet::of(&[Role::Customer, Role::Admin]);
///
/// assert!(BOOKINGS.contains(Role::Admin));
/// assert!(!BOOKINGS.contains(Role::Vendor));
/// ```
///
/// On the wire a set is a list of role names: `["customer", "admin"]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet(u8);

const fn bit(role: Role) -> u8 {
    match role {
        Role::Customer => 1 << 0,
        Role::Vendor => 1 << 1,
        Role::Admin => 1 << 2,
    }
}

impl RoleSet {
    /// Admits no one.
    pub const EMPTY: Self = Self(0);

    /// Every role.
    pub const ALL: Self = Self::of(&Role::ALL);

    /// A set with a single role.
    pub const fn only(role: Role) -> Self {
        Self(bit(role))
    }

    /// A set with each of `roles`. Repeats are harmless.
    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= bit(roles[i]);
            i += 1;
        }
        Self(bits)
    }

    /// This set plus `role`.
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | bit(role))
    }

    /// Every role in either set.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & bit(role) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The members, in [`Role::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self::only(role)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().collect()
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(set: RoleSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// `customer|admin`, or `none` for the empty set.
impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, role) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}
