pub mod affiliates;
pub mod auth;
pub mod bots;
pub mod campaigns;
pub mod clients;
pub mod contacts;
pub mod dashboard;
pub mod plans;
pub mod rcs_templates;
pub mod reports;
pub mod templates;
pub mod wallet;
