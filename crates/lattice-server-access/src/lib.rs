// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-resource ACL authorization engine.
//!
//! This crate is the stateful half of the Lattice access control system. It
//! owns the in-memory ACL store and the authorization gate every mutating
//! call passes through:
//!
//! - [`AclStore`]: thread-safe mapping from `(resource_type, resource_id)` to
//!   one [`Acl`](lattice_access_core::Acl), with an entry-id index for O(1)
//!   update/revoke
//! - [`AccessService`]: grant / update / revoke / list / purge, each checking
//!   the caller's effective permission against the hierarchy before mutating
//! - [`VisibilityFilter`]: narrows resource enumerations down to what the
//!   caller may see
//! - [`ResourceDirectory`]: the collaborator seam for resource existence
//!   checks, implemented by the services that own projects, cubes, etc.
//!
//! # Design Principles
//!
//! - **Explicit identity**: every operation takes the caller's
//!   [`CallerIdentity`](lattice_access_core::CallerIdentity) as a parameter;
//!   nothing is read from ambient state
//! - **Gate first**: mutations authorize before touching any state, so a
//!   denied call observably changes nothing
//! - **Read open, write gated**: listing an ACL's entries requires no
//!   permission; mutating one requires ADMINISTRATION or the out-of-band
//!   super-admin flag

pub mod directory;
pub mod service;
pub mod store;
pub mod visibility;

pub use directory::{ResourceDirectory, StaticDirectory};
pub use service::AccessService;
pub use store::AclStore;
pub use visibility::VisibilityFilter;
