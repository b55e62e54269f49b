//! Domain types, constants, and pure logic for the messaging console backend.
//!
//! Nothing in this crate touches the database or the network; handlers and
//! repositories call into these modules for validation and computation.

pub mod affiliate;
pub mod audience;
pub mod campaign;
pub mod channels;
pub mod contacts_csv;
pub mod error;
pub mod pricing;
pub mod rcs;
pub mod roles;
pub mod search;
pub mod template;
pub mod types;
pub mod validation;
pub mod wallet;
