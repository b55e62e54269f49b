//! Wallet ledger and campaign launch transactions.

use assert_matches::assert_matches;
use msgdesk_core::campaign::CampaignStatus;
use msgdesk_core::channels::Channel;
use msgdesk_core::error::CoreError;
use msgdesk_core::template::VariableMapping;
use msgdesk_core::wallet::TransactionKind;
use msgdesk_db::models::campaign::{Campaign, CreateCampaign, LaunchPlan, NewRecipient};
use msgdesk_db::models::client::{Client, CreateClient};
use msgdesk_db::models::contact::CreateContact;
use msgdesk_db::models::user::CreateUser;
use msgdesk_db::repositories::wallet_repo::LedgerEntry;
use msgdesk_db::repositories::{CampaignRepo, ClientRepo, ContactRepo, UserRepo, WalletRepo};
use msgdesk_db::RepoError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    client: Client,
    user_id: i64,
    contact_ids: Vec<i64>,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let client = ClientRepo::create(
        pool,
        &CreateClient {
            name: "Acme".into(),
            company_name: Some("Acme Retail".into()),
            email: "ops@acme.test".into(),
            phone: None,
            plan_id: None,
            affiliate_id: None,
        },
    )
    .await
    .unwrap();

    let role_id: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE name = 'client_admin'")
        .fetch_one(pool)
        .await
        .unwrap();
    let user = UserRepo::create(
        pool,
        &CreateUser {
            client_id: Some(client.id),
            role_id,
            username: "acme_admin".into(),
            email: "admin@acme.test".into(),
            password_hash: "not-a-real-hash".into(),
        },
    )
    .await
    .unwrap();

    let mut contact_ids = Vec::new();
    for phone in ["+919800000001", "+919800000002", "+919800000003"] {
        let contact = ContactRepo::create(
            pool,
            client.id,
            &CreateContact {
                name: None,
                phone: phone.into(),
                email: None,
                attributes: serde_json::Map::new(),
            },
        )
        .await
        .unwrap();
        contact_ids.push(contact.id);
    }

    Fixture {
        client,
        user_id: user.id,
        contact_ids,
    }
}

async fn draft(pool: &PgPool, f: &Fixture) -> Campaign {
    CampaignRepo::create(
        pool,
        f.client.id,
        Channel::Sms,
        f.user_id,
        &CreateCampaign {
            name: "Flash sale".into(),
            channel: Some("sms".into()),
            bot_id: None,
            template_id: None,
            body: Some("Sale today".into()),
            variable_mapping: VariableMapping::new(),
            scheduled_at: None,
        },
    )
    .await
    .unwrap()
}

async fn top_up(pool: &PgPool, client_id: i64, amount_cents: i64) {
    WalletRepo::record(
        pool,
        client_id,
        &LedgerEntry {
            kind: TransactionKind::Credit,
            amount_cents,
            description: Some("Top-up"),
            campaign_id: None,
            created_by: None,
        },
    )
    .await
    .unwrap();
}

fn launch_plan(f: &Fixture, status: CampaignStatus, cost_cents: i64) -> LaunchPlan {
    LaunchPlan {
        cost_cents,
        status,
        recipients: ["+919800000001", "+919800000002"]
            .iter()
            .zip(&f.contact_ids)
            .map(|(phone, id)| NewRecipient {
                contact_id: Some(*id),
                phone: phone.to_string(),
                rendered_body: "Sale today".into(),
            })
            .collect(),
        launched_by: f.user_id,
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_wallet_credit_then_overdraft(pool: PgPool) {
    let f = fixture(&pool).await;
    top_up(&pool, f.client.id, 500).await;

    let err = WalletRepo::record(
        &pool,
        f.client.id,
        &LedgerEntry {
            kind: TransactionKind::Debit,
            amount_cents: 501,
            description: None,
            campaign_id: None,
            created_by: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        RepoError::Domain(CoreError::InsufficientFunds {
            required: 501,
            available: 500
        })
    );

    let wallet = WalletRepo::find_by_client(&pool, f.client.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance_cents, 500);
    let ledger = WalletRepo::list_transactions(&pool, f.client.id, 10, 0).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].balance_after_cents, 500);
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_set_audience_ignores_foreign_ids(pool: PgPool) {
    let f = fixture(&pool).await;
    let campaign = draft(&pool, &f).await;

    let mut ids = f.contact_ids.clone();
    ids.push(987_654);
    let count = CampaignRepo::set_audience(&pool, f.client.id, campaign.id, &ids)
        .await
        .unwrap();
    assert_eq!(count, 3);

    let stored = CampaignRepo::find_by_id(&pool, f.client.id, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.audience_count, 3);
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_launch_debits_and_queues_recipients(pool: PgPool) {
    let f = fixture(&pool).await;
    top_up(&pool, f.client.id, 1_000).await;
    let campaign = draft(&pool, &f).await;

    let launched = CampaignRepo::launch(
        &pool,
        f.client.id,
        campaign.id,
        &launch_plan(&f, CampaignStatus::Running, 50),
    )
    .await
    .unwrap();

    assert_eq!(launched.status, "running");
    assert_eq!(launched.audience_count, 2);
    assert_eq!(launched.estimated_cost_cents, Some(50));
    assert!(launched.launched_at.is_some());

    let wallet = WalletRepo::find_by_client(&pool, f.client.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance_cents, 950);

    let recipients = CampaignRepo::list_recipients(&pool, campaign.id, None, 10, 0)
        .await
        .unwrap();
    assert_eq!(recipients.len(), 2);
    assert!(recipients.iter().all(|r| r.status == "queued"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_launch_with_insufficient_funds_writes_nothing(pool: PgPool) {
    let f = fixture(&pool).await;
    top_up(&pool, f.client.id, 10).await;
    let campaign = draft(&pool, &f).await;

    let err = CampaignRepo::launch(
        &pool,
        f.client.id,
        campaign.id,
        &launch_plan(&f, CampaignStatus::Running, 50),
    )
    .await
    .unwrap_err();
    assert_matches!(err, RepoError::Domain(CoreError::InsufficientFunds { .. }));

    let stored = CampaignRepo::find_by_id(&pool, f.client.id, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "draft");
    let recipients = CampaignRepo::list_recipients(&pool, campaign.id, None, 10, 0)
        .await
        .unwrap();
    assert!(recipients.is_empty());
    let wallet = WalletRepo::find_by_client(&pool, f.client.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance_cents, 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_launched_campaign_is_no_longer_editable(pool: PgPool) {
    let f = fixture(&pool).await;
    top_up(&pool, f.client.id, 1_000).await;
    let campaign = draft(&pool, &f).await;
    CampaignRepo::launch(
        &pool,
        f.client.id,
        campaign.id,
        &launch_plan(&f, CampaignStatus::Running, 50),
    )
    .await
    .unwrap();

    assert!(!CampaignRepo::delete_draft(&pool, f.client.id, campaign.id).await.unwrap());
    let err = CampaignRepo::set_audience(&pool, f.client.id, campaign.id, &f.contact_ids)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Domain(CoreError::Conflict(_)));

    let err = CampaignRepo::launch(
        &pool,
        f.client.id,
        campaign.id,
        &launch_plan(&f, CampaignStatus::Running, 50),
    )
    .await
    .unwrap_err();
    assert_matches!(err, RepoError::Domain(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_scheduled_campaign_refunds(pool: PgPool) {
    let f = fixture(&pool).await;
    top_up(&pool, f.client.id, 1_000).await;
    let campaign = draft(&pool, &f).await;
    CampaignRepo::launch(
        &pool,
        f.client.id,
        campaign.id,
        &launch_plan(&f, CampaignStatus::Scheduled, 80),
    )
    .await
    .unwrap();

    let cancelled = CampaignRepo::cancel(&pool, f.client.id, campaign.id, f.user_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let wallet = WalletRepo::find_by_client(&pool, f.client.id).await.unwrap().unwrap();
    assert_eq!(wallet.balance_cents, 1_000);
    let recipients = CampaignRepo::list_recipients(&pool, campaign.id, None, 10, 0)
        .await
        .unwrap();
    assert!(recipients.iter().all(|r| r.status == "failed"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_campaign_is_not_found(pool: PgPool) {
    let f = fixture(&pool).await;
    let err = CampaignRepo::complete(&pool, f.client.id, 424_242).await.unwrap_err();
    assert_matches!(err, RepoError::Domain(CoreError::NotFound { entity: "Campaign", .. }));
}
