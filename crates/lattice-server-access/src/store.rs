// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Thread-safe ACL store.
//!
//! Maps `(resource_type, resource_id)` to one [`Acl`] behind a per-resource
//! lock, plus an `EntryId -> ResourceRef` index so update/revoke by id never
//! scans. Mutations on the same ACL serialize on its lock; grants against
//! different resources only contend on the brief outer map access.
//!
//! Lock discipline: the resource map and the entry index are acquired either
//! standalone or while already holding the target ACL's lock, never while
//! waiting on an ACL. Mutations re-check under the ACL's write lock that the
//! map still links it, so a purged ACL never accepts a late entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use lattice_access_core::{
	AccessEntry, AccessError, Acl, CallerIdentity, EntryId, Permission, ResourceRef, Sid,
};

/// A thread-safe store of per-resource ACLs.
#[derive(Clone, Default)]
pub struct AclStore {
	inner: Arc<AclStoreInner>,
}

#[derive(Default)]
struct AclStoreInner {
	/// One ACL per resource, individually locked.
	resources: RwLock<HashMap<ResourceRef, Arc<RwLock<Acl>>>>,
	/// Reverse index from entry id to its owning resource.
	entry_index: RwLock<HashMap<EntryId, ResourceRef>>,
}

impl AclStore {
	/// Create an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up the ACL for a resource, if one exists.
	fn acl(&self, resource: &ResourceRef) -> Option<Arc<RwLock<Acl>>> {
		self.inner.resources.read().get(resource).cloned()
	}

	/// Return the existing ACL for a resource, or create an empty one owned
	/// by `owner`.
	fn get_or_create(&self, resource: &ResourceRef, owner: &Sid) -> Arc<RwLock<Acl>> {
		if let Some(acl) = self.acl(resource) {
			return acl;
		}
		let mut resources = self.inner.resources.write();
		// Re-check under the write lock; another caller may have created it.
		resources
			.entry(resource.clone())
			.or_insert_with(|| {
				Arc::new(RwLock::new(Acl::new(resource.clone(), owner.clone())))
			})
			.clone()
	}

	/// Add a grant for `sid` on `resource`, creating the ACL lazily.
	///
	/// The first grant against a resource sets `owner`. Fails with
	/// [`AccessError::DuplicateSid`] if the Sid already holds an entry.
	pub fn add_entry(
		&self,
		resource: &ResourceRef,
		owner: &Sid,
		sid: Sid,
		permission: Permission,
	) -> Result<AccessEntry, AccessError> {
		loop {
			let acl = self.get_or_create(resource, owner);
			let mut guard = acl.write();
			// A concurrent remove_acl may have unlinked this ACL between the
			// map lookup and taking its lock; committing into an orphaned ACL
			// would leave a dangling index row and an entry no read can see.
			if !self.is_linked(resource, &acl) {
				continue;
			}
			let entry = guard.add_entry(sid, permission)?;
			// Index insert happens under the ACL write lock, so remove_acl's
			// index cleanup can never interleave with it.
			self.inner
				.entry_index
				.write()
				.insert(entry.id, resource.clone());
			return Ok(entry);
		}
	}

	/// Returns true if the map still links this exact ACL handle.
	fn is_linked(&self, resource: &ResourceRef, acl: &Arc<RwLock<Acl>>) -> bool {
		self.inner
			.resources
			.read()
			.get(resource)
			.is_some_and(|current| Arc::ptr_eq(current, acl))
	}

	/// Change the permission of an entry identified by id alone.
	///
	/// Fails with [`AccessError::EntryNotFound`] if no entry with that id
	/// exists anywhere in the store.
	pub fn update_entry(
		&self,
		entry_id: EntryId,
		permission: Permission,
	) -> Result<AccessEntry, AccessError> {
		let resource = self.resource_of(entry_id).ok_or(AccessError::EntryNotFound { entry_id })?;
		let acl = self
			.acl(&resource)
			.ok_or(AccessError::EntryNotFound { entry_id })?;
		let mut acl = acl.write();
		acl.update_entry(entry_id, permission)
	}

	/// Remove an entry by id. A second removal of the same id fails with
	/// [`AccessError::EntryNotFound`].
	pub fn remove_entry(&self, entry_id: EntryId) -> Result<(), AccessError> {
		let resource = self.resource_of(entry_id).ok_or(AccessError::EntryNotFound { entry_id })?;
		let acl = self
			.acl(&resource)
			.ok_or(AccessError::EntryNotFound { entry_id })?;
		let mut acl = acl.write();
		acl.remove_entry(entry_id)?;
		self.inner.entry_index.write().remove(&entry_id);
		Ok(())
	}

	/// The resource an entry belongs to, if the entry exists.
	pub fn resource_of(&self, entry_id: EntryId) -> Option<ResourceRef> {
		self.inner.entry_index.read().get(&entry_id).cloned()
	}

	/// Snapshot the entries for a resource, in insertion order.
	///
	/// Returns an empty list (not an error) when the resource has no ACL.
	pub fn list_entries(&self, resource: &ResourceRef) -> Vec<AccessEntry> {
		match self.acl(resource) {
			Some(acl) => acl.read().entries().to_vec(),
			None => Vec::new(),
		}
	}

	/// The owner recorded at the ACL's lazy creation, if the resource has one.
	pub fn owner_of(&self, resource: &ResourceRef) -> Option<Sid> {
		self.acl(resource).map(|acl| acl.read().owner.clone())
	}

	/// Resolve the caller's effective permission on a resource from entry
	/// data alone. `None` when no ACL or no matching entry exists.
	pub fn effective_permission(
		&self,
		resource: &ResourceRef,
		caller: &CallerIdentity,
	) -> Option<Permission> {
		let acl = self.acl(resource)?;
		let acl = acl.read();
		acl.effective_permission(caller)
	}

	/// Drop a resource's whole ACL and its index entries. No-op when the
	/// resource has no ACL.
	///
	/// The ACL's write lock is held across both the unlink and the index
	/// cleanup, so an in-flight grant on the same resource either commits
	/// before the purge (and is cleaned up here) or observes the unlink and
	/// retries against a fresh ACL.
	pub fn remove_acl(&self, resource: &ResourceRef) {
		loop {
			let Some(acl) = self.acl(resource) else {
				return;
			};
			let guard = acl.write();
			{
				let mut resources = self.inner.resources.write();
				let still_linked = resources
					.get(resource)
					.is_some_and(|current| Arc::ptr_eq(current, &acl));
				if !still_linked {
					// Unlinked or replaced before we took the lock.
					continue;
				}
				resources.remove(resource);
			}
			let mut index = self.inner.entry_index.write();
			for entry in guard.entries() {
				index.remove(&entry.id);
			}
			return;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lattice_access_core::CallerIdentity;

	fn cube(id: &str) -> ResourceRef {
		ResourceRef::new("cube", id)
	}

	fn admin_sid() -> Sid {
		Sid::principal("ADMIN")
	}

	#[test]
	fn list_unknown_resource_is_empty_not_error() {
		let store = AclStore::new();
		assert!(store.list_entries(&cube("missing")).is_empty());
	}

	#[test]
	fn add_then_list() {
		let store = AclStore::new();
		let entry = store
			.add_entry(
				&cube("c1"),
				&admin_sid(),
				Sid::principal("MODELER"),
				Permission::Administration,
			)
			.unwrap();
		let entries = store.list_entries(&cube("c1"));
		assert_eq!(entries, vec![entry]);
	}

	#[test]
	fn first_grant_sets_owner_once() {
		let store = AclStore::new();
		store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		store
			.add_entry(
				&cube("c1"),
				&Sid::principal("someone-else"),
				Sid::principal("b"),
				Permission::Read,
			)
			.unwrap();
		assert_eq!(store.owner_of(&cube("c1")), Some(admin_sid()));
	}

	#[test]
	fn update_by_id_without_resource_hint() {
		let store = AclStore::new();
		let entry = store
			.add_entry(
				&cube("c1"),
				&admin_sid(),
				Sid::principal("MODELER"),
				Permission::Administration,
			)
			.unwrap();
		let updated = store.update_entry(entry.id, Permission::Read).unwrap();
		assert_eq!(updated.id, entry.id);
		assert_eq!(updated.sid, entry.sid);
		assert_eq!(updated.permission, Permission::Read);
	}

	#[test]
	fn second_removal_surfaces_entry_not_found() {
		let store = AclStore::new();
		let entry = store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		store.remove_entry(entry.id).unwrap();
		let err = store.remove_entry(entry.id).unwrap_err();
		assert!(matches!(err, AccessError::EntryNotFound { .. }));
	}

	#[test]
	fn entry_index_tracks_owning_resource() {
		let store = AclStore::new();
		let entry = store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		assert_eq!(store.resource_of(entry.id), Some(cube("c1")));
		store.remove_entry(entry.id).unwrap();
		assert_eq!(store.resource_of(entry.id), None);
	}

	#[test]
	fn acl_persists_empty_after_last_removal() {
		let store = AclStore::new();
		let entry = store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		store.remove_entry(entry.id).unwrap();
		assert!(store.list_entries(&cube("c1")).is_empty());
		assert_eq!(store.owner_of(&cube("c1")), Some(admin_sid()));
	}

	#[test]
	fn remove_acl_drops_entries_and_index() {
		let store = AclStore::new();
		let entry = store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		store.remove_acl(&cube("c1"));
		assert!(store.list_entries(&cube("c1")).is_empty());
		assert_eq!(store.owner_of(&cube("c1")), None);
		assert_eq!(store.resource_of(entry.id), None);
		// A no-op on a resource that never had an ACL.
		store.remove_acl(&cube("never"));
	}

	#[test]
	fn resources_are_independent() {
		let store = AclStore::new();
		store
			.add_entry(&cube("c1"), &admin_sid(), Sid::principal("a"), Permission::Read)
			.unwrap();
		store
			.add_entry(
				&ResourceRef::new("project", "p1"),
				&admin_sid(),
				Sid::principal("a"),
				Permission::Management,
			)
			.unwrap();
		assert_eq!(store.list_entries(&cube("c1")).len(), 1);
		assert_eq!(
			store.list_entries(&ResourceRef::new("project", "p1"))[0].permission,
			Permission::Management
		);
	}

	#[test]
	fn effective_permission_reads_through() {
		let store = AclStore::new();
		store
			.add_entry(
				&cube("c1"),
				&admin_sid(),
				Sid::role("ROLE_ANALYST"),
				Permission::Read,
			)
			.unwrap();
		let caller = CallerIdentity::user("alice").with_role("ROLE_ANALYST");
		assert_eq!(
			store.effective_permission(&cube("c1"), &caller),
			Some(Permission::Read)
		);
		assert_eq!(
			store.effective_permission(&cube("c1"), &CallerIdentity::user("bob")),
			None
		);
	}

	#[test]
	fn concurrent_grants_on_one_resource_keep_invariants() {
		let store = AclStore::new();
		let mut handles = Vec::new();
		for i in 0..8 {
			let store = store.clone();
			handles.push(std::thread::spawn(move || {
				for j in 0..16 {
					store
						.add_entry(
							&ResourceRef::new("cube", "shared"),
							&Sid::principal("ADMIN"),
							Sid::principal(format!("user-{i}-{j}")),
							Permission::Read,
						)
						.unwrap();
				}
			}));
		}
		for handle in handles {
			handle.join().unwrap();
		}
		let entries = store.list_entries(&ResourceRef::new("cube", "shared"));
		assert_eq!(entries.len(), 8 * 16);
		// Entry ids are unique across concurrent grants.
		let mut ids: Vec<_> = entries.iter().map(|e| e.id).collect();
		ids.sort_by_key(|id| *id.as_uuid());
		ids.dedup();
		assert_eq!(ids.len(), 8 * 16);
	}

	#[test]
	fn concurrent_duplicate_grants_admit_exactly_one() {
		let store = AclStore::new();
		let mut handles = Vec::new();
		for _ in 0..8 {
			let store = store.clone();
			handles.push(std::thread::spawn(move || {
				store
					.add_entry(
						&ResourceRef::new("cube", "c1"),
						&Sid::principal("ADMIN"),
						Sid::principal("MODELER"),
						Permission::Read,
					)
					.is_ok()
			}));
		}
		let successes = handles
			.into_iter()
			.map(|h| h.join().unwrap())
			.filter(|ok| *ok)
			.count();
		assert_eq!(successes, 1);
		assert_eq!(store.list_entries(&ResourceRef::new("cube", "c1")).len(), 1);
	}

	#[test]
	fn grants_racing_acl_removal_never_leave_dangling_index_rows() {
		let store = AclStore::new();
		let resource = ResourceRef::new("cube", "contended");
		let mut handles = Vec::new();
		for i in 0..4 {
			let store = store.clone();
			let resource = resource.clone();
			handles.push(std::thread::spawn(move || {
				let mut granted = Vec::new();
				for j in 0..32 {
					let result = store.add_entry(
						&resource,
						&Sid::principal("ADMIN"),
						Sid::principal(format!("user-{i}-{j}")),
						Permission::Read,
					);
					if let Ok(entry) = result {
						granted.push(entry.id);
					}
				}
				granted
			}));
		}
		{
			let store = store.clone();
			let resource = resource.clone();
			handles.push(std::thread::spawn(move || {
				for _ in 0..16 {
					store.remove_acl(&resource);
					std::thread::yield_now();
				}
				Vec::new()
			}));
		}
		let granted: Vec<EntryId> = handles
			.into_iter()
			.flat_map(|h| h.join().unwrap())
			.collect();

		// Whatever the interleaving, the index and the ACL must agree: a
		// granted entry either survives in the current ACL (and resolves
		// through the index) or was wiped by a later removal (and left no
		// index row behind).
		let surviving = store.list_entries(&resource);
		for entry in &surviving {
			assert_eq!(store.resource_of(entry.id), Some(resource.clone()));
		}
		for id in granted {
			match store.resource_of(id) {
				Some(owning) => {
					assert_eq!(owning, resource);
					assert!(surviving.iter().any(|e| e.id == id));
				}
				None => assert!(surviving.iter().all(|e| e.id != id)),
			}
		}
	}
}
