// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The access service: the authorization gate in front of every ACL mutation.
//!
//! Every mutating operation performs the same check before acting: the
//! caller's effective permission on the target resource must include
//! ADMINISTRATION, or the caller carries the out-of-band super-admin flag.
//! A failed check rejects the call with `AccessDenied` and changes nothing.
//!
//! Reads are deliberately ungated: any authenticated caller may list an
//! ACL's entries. The asymmetry is part of the contract.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use lattice_access_core::{
	AccessEntry, AccessError, CallerIdentity, EntryId, Permission, ResourceRef, Sid,
};

use crate::directory::ResourceDirectory;
use crate::store::AclStore;

/// Grant, update, revoke and list access entries, enforcing the
/// ADMINISTRATION gate on every mutation.
#[derive(Clone)]
pub struct AccessService {
	store: AclStore,
	directory: Arc<dyn ResourceDirectory>,
}

impl AccessService {
	/// Create a service over the given store and resource directory.
	pub fn new(store: AclStore, directory: Arc<dyn ResourceDirectory>) -> Self {
		Self { store, directory }
	}

	/// The underlying store handle.
	pub fn store(&self) -> &AclStore {
		&self.store
	}

	/// Resolve the caller's effective permission on a resource.
	///
	/// Super-administrators always resolve to ADMINISTRATION without
	/// consulting any ACL; otherwise this is the strongest permission among
	/// entries matching the caller's identity set, or `None`.
	pub fn effective_permission(
		&self,
		resource: &ResourceRef,
		caller: &CallerIdentity,
	) -> Option<Permission> {
		if caller.is_super_admin {
			return Some(Permission::Administration);
		}
		self.store.effective_permission(resource, caller)
	}

	/// The ADMINISTRATION gate run ahead of every mutation.
	fn authorize_mutation(
		&self,
		resource: &ResourceRef,
		caller: &CallerIdentity,
	) -> Result<(), AccessError> {
		let effective = self.effective_permission(resource, caller);
		let allowed = effective
			.map(|p| p.includes(Permission::Administration))
			.unwrap_or(false);
		if allowed {
			debug!(principal = %caller.principal, resource = %resource, "acl mutation authorized");
			Ok(())
		} else {
			warn!(
				principal = %caller.principal,
				resource = %resource,
				effective = ?effective,
				"acl mutation denied"
			);
			Err(AccessError::AccessDenied {
				resource: resource.clone(),
			})
		}
	}

	/// Verify that an entry id actually belongs to the named resource.
	///
	/// Update and revoke are authorized against the resource the caller
	/// names, so an entry guessed from another resource must not be
	/// reachable through it.
	fn check_entry_ownership(
		&self,
		resource: &ResourceRef,
		entry_id: EntryId,
	) -> Result<(), AccessError> {
		match self.store.resource_of(entry_id) {
			Some(owning) if &owning == resource => Ok(()),
			_ => Err(AccessError::EntryNotFound { entry_id }),
		}
	}

	/// Grant `permission` to `sid` on `resource`.
	///
	/// Rejects nonexistent resources with `ResourceNotFound` before any ACL
	/// is created. The first grant on a resource lazily creates its ACL,
	/// owned by the caller's principal Sid. Granting to a Sid that already
	/// holds an entry fails with `DuplicateSid`; callers update instead.
	///
	/// Returns the resource's full, current entry list.
	#[instrument(level = "debug", skip(self, caller), fields(principal = %caller.principal, resource = %resource))]
	pub fn grant(
		&self,
		resource: &ResourceRef,
		sid: Sid,
		permission: Permission,
		caller: &CallerIdentity,
	) -> Result<Vec<AccessEntry>, AccessError> {
		if !self.directory.resource_exists(resource) {
			return Err(AccessError::ResourceNotFound {
				resource: resource.clone(),
			});
		}
		self.authorize_mutation(resource, caller)?;
		self.store
			.add_entry(resource, &caller.principal, sid, permission)?;
		Ok(self.store.list_entries(resource))
	}

	/// Change the permission of an existing entry on `resource`.
	///
	/// The entry's id and sid are unchanged. Fails with `EntryNotFound` when
	/// the id is unknown or belongs to a different resource.
	///
	/// Returns the full updated entry list.
	#[instrument(level = "debug", skip(self, caller), fields(principal = %caller.principal, resource = %resource))]
	pub fn update(
		&self,
		resource: &ResourceRef,
		entry_id: EntryId,
		new_permission: Permission,
		caller: &CallerIdentity,
	) -> Result<Vec<AccessEntry>, AccessError> {
		self.authorize_mutation(resource, caller)?;
		self.check_entry_ownership(resource, entry_id)?;
		self.store.update_entry(entry_id, new_permission)?;
		Ok(self.store.list_entries(resource))
	}

	/// Remove an entry from `resource`.
	///
	/// Same cross-check as update. Returns the remaining entry list, which
	/// may be empty.
	#[instrument(level = "debug", skip(self, caller), fields(principal = %caller.principal, resource = %resource))]
	pub fn revoke(
		&self,
		resource: &ResourceRef,
		entry_id: EntryId,
		caller: &CallerIdentity,
	) -> Result<Vec<AccessEntry>, AccessError> {
		self.authorize_mutation(resource, caller)?;
		self.check_entry_ownership(resource, entry_id)?;
		self.store.remove_entry(entry_id)?;
		Ok(self.store.list_entries(resource))
	}

	/// List a resource's entries in insertion order.
	///
	/// Ungated: requires no permission on the resource. Unknown resources
	/// yield an empty list, not an error.
	pub fn list(&self, resource: &ResourceRef) -> Vec<AccessEntry> {
		self.store.list_entries(resource)
	}

	/// Drop a resource's entire ACL, typically when the host entity is
	/// deleted. Gated like every other mutation; a no-op when the resource
	/// has no ACL.
	#[instrument(level = "debug", skip(self, caller), fields(principal = %caller.principal, resource = %resource))]
	pub fn purge(
		&self,
		resource: &ResourceRef,
		caller: &CallerIdentity,
	) -> Result<(), AccessError> {
		self.authorize_mutation(resource, caller)?;
		self.store.remove_acl(resource);
		Ok(())
	}
}
