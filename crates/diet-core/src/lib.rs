//! Core of Daily Diet: anonymous sessions own meal records, and each
//! session can ask for its on-diet metrics.
//!
//! - [`session`] resolves or mints the caller's [`model::SessionId`].
//! - [`storage`] persists meals in SQLite, scoped by owner.
//! - [`metrics`] computes counts and the longest on-diet streak.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod session;
pub mod storage;
