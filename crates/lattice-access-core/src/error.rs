// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the access control engine.

use crate::types::{EntryId, ResourceRef, Sid};
use thiserror::Error;

/// Errors that can occur in the access control engine.
///
/// Every failure is terminal for the call: the engine never retries
/// internally, and no partial mutation is observable after an error.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
	/// Caller lacks ADMINISTRATION on the target resource and is not a
	/// super-administrator.
	#[error("access denied on {resource}")]
	AccessDenied { resource: ResourceRef },

	/// The target resource does not exist in the host system.
	#[error("resource not found: {resource}")]
	ResourceNotFound { resource: ResourceRef },

	/// No entry with this id exists on the named resource.
	#[error("access entry not found: {entry_id}")]
	EntryNotFound { entry_id: EntryId },

	/// The Sid already holds an entry on this resource; use update instead.
	#[error("sid already holds an entry: {sid}")]
	DuplicateSid { sid: Sid },

	/// Unparseable permission name.
	#[error("invalid permission: {0}")]
	InvalidPermission(String),
}
