// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The fixed permission hierarchy.
//!
//! Four totally ordered levels, weakest to strongest:
//! `Read < Operation < Management < Administration`. Holding a stronger
//! permission includes every weaker capability on the same resource. The
//! ordering is fixed at compile time and never reconfigured.

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission level on one resource.
///
/// Declaration order is the hierarchy order, so the derived [`Ord`] is the
/// "includes" relation's underlying ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
	/// See the resource and its entries.
	Read,
	/// Operate the resource (build, refresh, query).
	Operation,
	/// Manage the resource's definition.
	Management,
	/// Full control, including mutating the resource's ACL.
	Administration,
}

impl Permission {
	/// Returns all permission levels, weakest first.
	pub fn all() -> &'static [Permission] {
		&[
			Permission::Read,
			Permission::Operation,
			Permission::Management,
			Permission::Administration,
		]
	}

	/// The numeric rank of this level within the hierarchy.
	pub fn rank(&self) -> u8 {
		*self as u8
	}

	/// Returns true if this permission includes all capabilities of `other`.
	pub fn includes(&self, other: Permission) -> bool {
		self.rank() >= other.rank()
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Permission::Read => write!(f, "READ"),
			Permission::Operation => write!(f, "OPERATION"),
			Permission::Management => write!(f, "MANAGEMENT"),
			Permission::Administration => write!(f, "ADMINISTRATION"),
		}
	}
}

impl FromStr for Permission {
	type Err = AccessError;

	/// Parse a permission name from external input, case-insensitively.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"READ" => Ok(Permission::Read),
			"OPERATION" => Ok(Permission::Operation),
			"MANAGEMENT" => Ok(Permission::Management),
			"ADMINISTRATION" => Ok(Permission::Administration),
			_ => Err(AccessError::InvalidPermission(s.to_string())),
		}
	}
}
