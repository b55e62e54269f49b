//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Tenant-owned tables are always
//! filtered by `client_id`, so a row belonging to another client behaves
//! exactly like a missing row.

pub mod affiliate_repo;
pub mod bot_repo;
pub mod campaign_repo;
pub mod client_repo;
pub mod contact_repo;
pub mod plan_repo;
pub mod rcs_template_repo;
pub mod report_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod wallet_repo;

pub use affiliate_repo::AffiliateRepo;
pub use bot_repo::BotRepo;
pub use campaign_repo::CampaignRepo;
pub use client_repo::ClientRepo;
pub use contact_repo::ContactRepo;
pub use plan_repo::PlanRepo;
pub use rcs_template_repo::RcsTemplateRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use wallet_repo::WalletRepo;
