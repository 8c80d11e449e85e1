// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visibility filtering for resource enumerations.
//!
//! Listing collaborators ("list all projects", "list all cubes") assemble
//! their full candidate set, then narrow it here before returning results.
//! Holding any permission on a resource, even the weakest READ, makes it
//! visible. Super-administrators see every candidate unconditionally through
//! an explicit fast path that never touches the store.

use tracing::debug;

use lattice_access_core::{CallerIdentity, ResourceRef};

use crate::store::AclStore;

/// Narrows candidate resource sets to what a caller may see.
#[derive(Clone)]
pub struct VisibilityFilter {
	store: AclStore,
}

impl VisibilityFilter {
	/// Create a filter over the given store.
	pub fn new(store: AclStore) -> Self {
		Self { store }
	}

	/// Returns true if the caller holds any permission on the resource.
	pub fn is_visible(&self, resource: &ResourceRef, caller: &CallerIdentity) -> bool {
		if caller.is_super_admin {
			return true;
		}
		self.store.effective_permission(resource, caller).is_some()
	}

	/// Keep only the candidate ids the caller may see, preserving input
	/// order.
	pub fn filter_visible(
		&self,
		resource_type: &str,
		candidate_ids: &[String],
		caller: &CallerIdentity,
	) -> Vec<String> {
		// Super-admins bypass the store entirely.
		if caller.is_super_admin {
			return candidate_ids.to_vec();
		}
		let visible: Vec<String> = candidate_ids
			.iter()
			.filter(|id| {
				let resource = ResourceRef::new(resource_type, id.as_str());
				self.store.effective_permission(&resource, caller).is_some()
			})
			.cloned()
			.collect();
		debug!(
			principal = %caller.principal,
			resource_type,
			candidates = candidate_ids.len(),
			visible = visible.len(),
			"filtered resource listing"
		);
		visible
	}
}
