//! Core library for signup-gate
//!
//! This crate implements the pre-signup decision pipeline behind the
//! `signup-gate` Lambda entry point and the `signup-gate-replay` debug tool.
//! Its API is fluid and may change without warning and in a
//! semver-incompatible way.
//!
//! # Module Organization
//!
//! - [`config`]: process-wide configuration, read once from the environment
//! - [`event`]: the registration event model exchanged with the runtime
//! - [`verify`]: email verification providers
//! - [`policy`]: the opaque policy-evaluation capability
//! - [`handlers`]: per-event orchestration and decision mapping
//! - [`replay`]: offline batch replay of recorded events
//! - [`logging`]: diagnostic log setup

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod config;
pub mod event;
pub mod handlers;
pub mod logging;
pub mod policy;
pub mod replay;
pub mod verify;
