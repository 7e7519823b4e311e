//! Domain logic for the FG Vistos platform.
//!
//! This crate has no database or HTTP dependencies. Everything here is a
//! pure function of its inputs so it can be exercised directly in unit
//! tests and recomputed on every request.

pub mod access;
pub mod error;
pub mod form;
pub mod payment;
pub mod progress;
pub mod roles;
pub mod status;
pub mod types;
pub mod upload;
