// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity and resource reference types.
//!
//! - [`EntryId`]: type-safe UUID newtype identifying one access entry
//! - [`Sid`]: a normalized reference to a user or role principal
//! - [`CallerIdentity`]: the full identity set a caller presents for one
//!   request (principal + granted roles + super-admin flag)
//! - [`ResourceRef`]: the `(resource_type, resource_id)` pair an ACL is
//!   keyed by
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(EntryId, "Unique identifier for an access entry.");

// =============================================================================
// Sid
// =============================================================================

/// A normalized reference to a user or role principal.
///
/// ACL entries are keyed by Sid, and a caller's credentials are matched
/// against entry Sids during permission resolution. Two Sids are equal iff
/// both the variant and the name match: the user `ANALYST` and the role
/// `ANALYST` are distinct principals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sid {
	/// A concrete user principal.
	Principal(String),
	/// A role granted to users by the identity provider.
	Role(String),
}

impl Sid {
	/// Create a user principal Sid.
	pub fn principal(name: impl Into<String>) -> Self {
		Sid::Principal(name.into())
	}

	/// Create a role Sid.
	pub fn role(name: impl Into<String>) -> Self {
		Sid::Role(name.into())
	}

	/// Create a Sid from a name and a principal flag, mirroring the shape
	/// access requests arrive in at the boundary.
	pub fn new(name: impl Into<String>, is_principal: bool) -> Self {
		if is_principal {
			Sid::Principal(name.into())
		} else {
			Sid::Role(name.into())
		}
	}

	/// The principal or role name.
	pub fn name(&self) -> &str {
		match self {
			Sid::Principal(name) | Sid::Role(name) => name,
		}
	}

	/// Returns true if this Sid refers to a role rather than a user.
	pub fn is_role(&self) -> bool {
		matches!(self, Sid::Role(_))
	}
}

impl fmt::Display for Sid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Sid::Principal(name) => write!(f, "user:{name}"),
			Sid::Role(name) => write!(f, "role:{name}"),
		}
	}
}

// =============================================================================
// Caller Identity
// =============================================================================

/// The full identity set a caller presents for one request.
///
/// Resolved by the identity provider at the request boundary and passed
/// explicitly into every engine operation. Never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
	/// The caller's own principal Sid.
	pub principal: Sid,
	/// Role Sids granted to the caller by the identity provider.
	pub roles: Vec<Sid>,
	/// Out-of-band super-administrator flag. Bypasses all ACL checks; not
	/// itself an access entry.
	pub is_super_admin: bool,
}

impl CallerIdentity {
	/// Create an identity for a plain user with no roles.
	pub fn user(name: impl Into<String>) -> Self {
		Self {
			principal: Sid::principal(name),
			roles: Vec::new(),
			is_super_admin: false,
		}
	}

	/// Create a super-administrator identity.
	pub fn super_admin(name: impl Into<String>) -> Self {
		Self {
			principal: Sid::principal(name),
			roles: Vec::new(),
			is_super_admin: true,
		}
	}

	/// Builder: add a role Sid to the identity set.
	pub fn with_role(mut self, name: impl Into<String>) -> Self {
		self.roles.push(Sid::role(name));
		self
	}

	/// Iterate over every Sid the caller holds (principal first, then roles).
	pub fn sids(&self) -> impl Iterator<Item = &Sid> {
		std::iter::once(&self.principal).chain(self.roles.iter())
	}

	/// Returns true if the given Sid is part of the caller's identity set.
	pub fn matches(&self, sid: &Sid) -> bool {
		self.sids().any(|s| s == sid)
	}
}

// =============================================================================
// Resource Reference
// =============================================================================

/// The `(resource_type, resource_id)` pair one ACL is attached to.
///
/// The type vocabulary is owned by the host system (`"cube"`, `"project"`,
/// ...) and is extensible without engine changes; the engine never learns
/// anything about the resource beyond this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
	pub resource_type: String,
	pub resource_id: String,
}

impl ResourceRef {
	/// Create a resource reference.
	pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
		Self {
			resource_type: resource_type.into(),
			resource_id: resource_id.into(),
		}
	}
}

impl fmt::Display for ResourceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.resource_type, self.resource_id)
	}
}
