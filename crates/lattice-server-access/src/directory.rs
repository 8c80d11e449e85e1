// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource existence collaborator.
//!
//! The engine never owns project or cube entities; the services that do
//! implement [`ResourceDirectory`] so grants against nonexistent resources
//! can be rejected before any ACL is created.

use std::collections::HashSet;

use lattice_access_core::ResourceRef;

/// Existence check implemented by the services that own resources.
pub trait ResourceDirectory: Send + Sync {
	/// Returns true if the resource exists in the host system.
	fn resource_exists(&self, resource: &ResourceRef) -> bool;
}

/// A fixed directory of known resources.
///
/// Used in tests and by hosts whose resource set is known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
	known: HashSet<ResourceRef>,
}

impl StaticDirectory {
	/// Create an empty directory.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: register a resource as existing.
	pub fn with_resource(mut self, resource: ResourceRef) -> Self {
		self.known.insert(resource);
		self
	}

	/// Register a resource as existing.
	pub fn insert(&mut self, resource: ResourceRef) {
		self.known.insert(resource);
	}
}

impl ResourceDirectory for StaticDirectory {
	fn resource_exists(&self, resource: &ResourceRef) -> bool {
		self.known.contains(resource)
	}
}
