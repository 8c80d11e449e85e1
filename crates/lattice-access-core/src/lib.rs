// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the Lattice access control engine.
//!
//! This crate defines the domain model shared by the engine and its
//! collaborators:
//!
//! - **Identity types**: [`Sid`] (user or role principal) and
//!   [`CallerIdentity`] (the full identity set a caller presents)
//! - **Permission hierarchy**: [`Permission`], a fixed, totally ordered set of
//!   four levels where stronger levels include weaker ones
//! - **ACL types**: [`AccessEntry`] (one grant) and [`Acl`] (all grants for
//!   one resource), with the per-Sid uniqueness invariant enforced here
//! - **Errors**: [`AccessError`], the full failure taxonomy of the engine
//!
//! Everything in this crate is pure: no locking, no I/O, no ambient state.
//! The stateful store and the authorization gate live in
//! `lattice-server-access`.

pub mod entry;
pub mod error;
pub mod permission;
pub mod types;

pub use entry::{AccessEntry, Acl};
pub use error::AccessError;
pub use permission::Permission;
pub use types::{CallerIdentity, EntryId, ResourceRef, Sid};
