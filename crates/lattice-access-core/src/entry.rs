// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access entries and the per-resource ACL aggregate.
//!
//! An [`Acl`] owns the ordered list of [`AccessEntry`] grants for exactly one
//! resource. The per-Sid uniqueness invariant and effective-permission
//! resolution live here as pure methods; the thread-safe store in
//! `lattice-server-access` wraps this type in per-resource locks.

use crate::error::AccessError;
use crate::permission::Permission;
use crate::types::{CallerIdentity, EntryId, ResourceRef, Sid};
use serde::{Deserialize, Serialize};

/// One (principal, permission) grant on a resource.
///
/// The id is assigned at creation and is the sole handle used by update and
/// revoke. Id and sid never change for the lifetime of the entry; only the
/// permission field is mutable, and only through [`Acl::update_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
	pub id: EntryId,
	pub sid: Sid,
	pub permission: Permission,
	/// True for a positive grant. Denying entries are never produced by the
	/// engine's operations; the field exists so resolution can skip them if a
	/// store ever carries them.
	pub granting: bool,
}

/// The access control list for one resource.
///
/// Invariants:
/// - at most one entry per distinct Sid
/// - entries preserve insertion order; order carries no precedence meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
	pub resource: ResourceRef,
	/// The identity that performed the first grant on this resource.
	pub owner: Sid,
	entries: Vec<AccessEntry>,
}

impl Acl {
	/// Create an empty ACL owned by `owner`.
	pub fn new(resource: ResourceRef, owner: Sid) -> Self {
		Self {
			resource,
			owner,
			entries: Vec::new(),
		}
	}

	/// The entries in insertion order.
	pub fn entries(&self) -> &[AccessEntry] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the ACL has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Find the entry for a Sid, if any.
	pub fn entry_for_sid(&self, sid: &Sid) -> Option<&AccessEntry> {
		self.entries.iter().find(|e| &e.sid == sid)
	}

	/// Find an entry by id, if it belongs to this ACL.
	pub fn entry_by_id(&self, entry_id: EntryId) -> Option<&AccessEntry> {
		self.entries.iter().find(|e| e.id == entry_id)
	}

	/// Add a grant for `sid`.
	///
	/// Fails with [`AccessError::DuplicateSid`] if the Sid already holds an
	/// entry on this resource; callers must use update instead.
	pub fn add_entry(&mut self, sid: Sid, permission: Permission) -> Result<AccessEntry, AccessError> {
		if self.entry_for_sid(&sid).is_some() {
			return Err(AccessError::DuplicateSid { sid });
		}
		let entry = AccessEntry {
			id: EntryId::generate(),
			sid,
			permission,
			granting: true,
		};
		self.entries.push(entry.clone());
		Ok(entry)
	}

	/// Change the permission of an existing entry. Id and sid are unchanged.
	pub fn update_entry(
		&mut self,
		entry_id: EntryId,
		permission: Permission,
	) -> Result<AccessEntry, AccessError> {
		let entry = self
			.entries
			.iter_mut()
			.find(|e| e.id == entry_id)
			.ok_or(AccessError::EntryNotFound { entry_id })?;
		entry.permission = permission;
		Ok(entry.clone())
	}

	/// Remove an entry by id.
	///
	/// Removal is not idempotent: a second call with the same id surfaces
	/// [`AccessError::EntryNotFound`].
	pub fn remove_entry(&mut self, entry_id: EntryId) -> Result<AccessEntry, AccessError> {
		let index = self
			.entries
			.iter()
			.position(|e| e.id == entry_id)
			.ok_or(AccessError::EntryNotFound { entry_id })?;
		Ok(self.entries.remove(index))
	}

	/// Resolve the caller's effective permission on this resource.
	///
	/// The strongest permission among granting entries whose sid is part of
	/// the caller's identity set, or `None` if no entry matches. The
	/// super-admin fast path is the engine's responsibility, not resolved
	/// from entry data.
	pub fn effective_permission(&self, caller: &CallerIdentity) -> Option<Permission> {
		self.entries
			.iter()
			.filter(|e| e.granting && caller.matches(&e.sid))
			.map(|e| e.permission)
			.max()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cube_acl() -> Acl {
		Acl::new(ResourceRef::new("cube", "c1"), Sid::principal("ADMIN"))
	}

	#[test]
	fn add_entry_then_lookup() {
		let mut acl = cube_acl();
		let entry = acl
			.add_entry(Sid::principal("MODELER"), Permission::Administration)
			.unwrap();
		assert_eq!(acl.len(), 1);
		assert!(entry.granting);
		assert_eq!(acl.entry_for_sid(&Sid::principal("MODELER")), Some(&entry));
		assert_eq!(acl.entry_by_id(entry.id), Some(&entry));
	}

	#[test]
	fn duplicate_sid_is_rejected() {
		let mut acl = cube_acl();
		acl.add_entry(Sid::principal("MODELER"), Permission::Read)
			.unwrap();
		let err = acl
			.add_entry(Sid::principal("MODELER"), Permission::Administration)
			.unwrap_err();
		assert!(matches!(err, AccessError::DuplicateSid { .. }));
		// The original grant is untouched.
		assert_eq!(acl.len(), 1);
		assert_eq!(
			acl.entry_for_sid(&Sid::principal("MODELER")).unwrap().permission,
			Permission::Read
		);
	}

	#[test]
	fn same_name_different_kind_is_not_a_duplicate() {
		let mut acl = cube_acl();
		acl.add_entry(Sid::principal("ANALYST"), Permission::Read)
			.unwrap();
		acl.add_entry(Sid::role("ANALYST"), Permission::Operation)
			.unwrap();
		assert_eq!(acl.len(), 2);
	}

	#[test]
	fn update_preserves_id_and_sid() {
		let mut acl = cube_acl();
		let granted = acl
			.add_entry(Sid::principal("MODELER"), Permission::Administration)
			.unwrap();
		let updated = acl.update_entry(granted.id, Permission::Read).unwrap();
		assert_eq!(updated.id, granted.id);
		assert_eq!(updated.sid, granted.sid);
		assert_eq!(updated.permission, Permission::Read);
		assert_eq!(acl.len(), 1);
	}

	#[test]
	fn update_unknown_id_fails() {
		let mut acl = cube_acl();
		let err = acl
			.update_entry(EntryId::generate(), Permission::Read)
			.unwrap_err();
		assert!(matches!(err, AccessError::EntryNotFound { .. }));
	}

	#[test]
	fn remove_is_not_idempotent() {
		let mut acl = cube_acl();
		let entry = acl
			.add_entry(Sid::principal("MODELER"), Permission::Read)
			.unwrap();
		acl.remove_entry(entry.id).unwrap();
		assert!(acl.is_empty());
		let err = acl.remove_entry(entry.id).unwrap_err();
		assert!(matches!(err, AccessError::EntryNotFound { .. }));
	}

	#[test]
	fn entries_preserve_insertion_order() {
		let mut acl = cube_acl();
		for name in ["a", "b", "c"] {
			acl.add_entry(Sid::principal(name), Permission::Read).unwrap();
		}
		let names: Vec<_> = acl.entries().iter().map(|e| e.sid.name()).collect();
		assert_eq!(names, vec!["a", "b", "c"]);
	}

	mod effective_permission {
		use super::*;

		#[test]
		fn none_when_no_entry_matches() {
			let acl = cube_acl();
			let caller = CallerIdentity::user("nobody");
			assert_eq!(acl.effective_permission(&caller), None);
		}

		#[test]
		fn direct_principal_match() {
			let mut acl = cube_acl();
			acl.add_entry(Sid::principal("alice"), Permission::Management)
				.unwrap();
			let caller = CallerIdentity::user("alice");
			assert_eq!(
				acl.effective_permission(&caller),
				Some(Permission::Management)
			);
		}

		#[test]
		fn role_match_counts() {
			let mut acl = cube_acl();
			acl.add_entry(Sid::role("ROLE_ANALYST"), Permission::Read)
				.unwrap();
			let caller = CallerIdentity::user("alice").with_role("ROLE_ANALYST");
			assert_eq!(acl.effective_permission(&caller), Some(Permission::Read));
		}

		#[test]
		fn strongest_match_wins() {
			let mut acl = cube_acl();
			acl.add_entry(Sid::principal("alice"), Permission::Read)
				.unwrap();
			acl.add_entry(Sid::role("ROLE_OPS"), Permission::Management)
				.unwrap();
			let caller = CallerIdentity::user("alice").with_role("ROLE_OPS");
			assert_eq!(
				acl.effective_permission(&caller),
				Some(Permission::Management)
			);
		}

		#[test]
		fn non_granting_entries_are_skipped() {
			let mut acl = cube_acl();
			let entry = acl
				.add_entry(Sid::principal("alice"), Permission::Administration)
				.unwrap();
			// Simulate a denying entry carried by an external store.
			acl.entries[0] = AccessEntry {
				granting: false,
				..entry
			};
			let caller = CallerIdentity::user("alice");
			assert_eq!(acl.effective_permission(&caller), None);
		}
	}
}
