//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod affiliate;
pub mod bot;
pub mod campaign;
pub mod client;
pub mod contact;
pub mod plan;
pub mod rcs_template;
pub mod report;
pub mod role;
pub mod session;
pub mod user;
pub mod wallet;
