//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity is mutable

pub mod applicant;
pub mod attachment;
pub mod order;
pub mod plan;
pub mod role;
pub mod session;
pub mod user;
pub mod visa_type;
