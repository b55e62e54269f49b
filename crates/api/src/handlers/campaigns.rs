//! Handlers for the `/campaigns` resource: the draft wizard, audience
//! selection, cost estimates, launch and delivery receipts.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use msgdesk_core::audience::{AudienceSelection, ContactFilter};
use msgdesk_core::campaign::{
    can_advance, validate_step, CampaignDraft, CampaignStatus, RecipientStatus, WizardStep,
};
use msgdesk_core::channels::Channel;
use msgdesk_core::contacts_csv::RejectedRow;
use msgdesk_core::error::CoreError;
use msgdesk_core::pricing::{estimate_campaign, CostEstimate};
use msgdesk_core::rcs::TemplateStatus;
use msgdesk_core::template::{
    render, resolve_values, sms_segment_count, unmapped_variables, validate_body,
    RecipientFields,
};
use msgdesk_core::types::{Cents, DbId, Timestamp};
use msgdesk_core::validation::{validate_optional_text, validate_required_text, MAX_NAME_LENGTH};
use msgdesk_db::models::campaign::{
    Campaign, CampaignRecipient, CreateCampaign, LaunchPlan, NewRecipient, UpdateCampaign,
};
use msgdesk_db::models::contact::Contact;
use msgdesk_db::repositories::{BotRepo, CampaignRepo, ContactRepo, RcsTemplateRepo, WalletRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::contacts::read_csv_upload;
use crate::middleware::rbac::TenantUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

/// Request body for `PUT /campaigns/{id}/audience`.
///
/// With `select_all` the audience becomes every opted-in contact matching
/// `search`; otherwise it is exactly `contact_ids`.
#[derive(Debug, Default, Deserialize)]
pub struct AudienceRequest {
    #[serde(default)]
    pub contact_ids: Vec<DbId>,
    #[serde(default)]
    pub select_all: bool,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AudienceResponse {
    pub audience_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CsvAudienceResponse {
    pub audience_count: i64,
    pub inserted: u64,
    pub updated: u64,
    pub rejected: Vec<RejectedRow>,
}

/// Request body for `POST /campaigns/{id}/preview`.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    /// Contact to render for; defaults to the first audience member.
    pub contact_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct CampaignPreview {
    pub contact_id: Option<DbId>,
    pub body: String,
    pub rendered: String,
    pub unmapped_variables: Vec<String>,
    pub sms_segments: usize,
}

#[derive(Debug, Serialize)]
pub struct CampaignEstimate {
    #[serde(flatten)]
    pub estimate: CostEstimate,
    pub balance_cents: Cents,
    pub sufficient_funds: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub from: WizardStep,
}

#[derive(Debug, Serialize)]
pub struct WizardProgress {
    pub completed: WizardStep,
    pub next: WizardStep,
}

/// Request body for `PUT /campaigns/{id}/recipients/{recipient_id}/status`.
#[derive(Debug, Deserialize)]
pub struct RecipientStatusRequest {
    pub status: RecipientStatus,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Draft CRUD
// ---------------------------------------------------------------------------

/// GET /api/campaigns?status=&limit=&offset=
pub async fn list(
    user: TenantUser,
    State(state): State<AppState>,
    Query(filter): Query<StatusParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<CampaignStatus>)
        .transpose()?;
    let (limit, offset) = page.clamped();
    let campaigns =
        CampaignRepo::list(&state.pool, user.client_id, status, limit, offset).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// POST /api/campaigns
///
/// Creates a draft. Name and channel are required; everything else can be
/// filled in later.
pub async fn create(
    user: TenantUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    let channel = input
        .channel
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<Channel>)
        .transpose()?;
    let draft = CampaignDraft {
        name: input.name.clone(),
        channel,
        ..CampaignDraft::default()
    };
    validate_step(WizardStep::Details, &draft, Utc::now())?;
    let channel = channel.ok_or_else(|| {
        AppError::Core(CoreError::Validation("A channel must be selected".into()))
    })?;

    validate_message_fields(
        &state,
        user.client_id,
        channel,
        input.bot_id,
        input.template_id,
        input.body.as_deref(),
        input.scheduled_at,
    )
    .await?;

    let campaign =
        CampaignRepo::create(&state.pool, user.client_id, channel, user.user_id, &input).await?;
    tracing::info!(
        campaign_id = campaign.id,
        client_id = user.client_id,
        channel = %channel,
        "Campaign draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/campaigns/{id}
pub async fn get_by_id(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    Ok(Json(DataResponse { data: campaign }))
}

/// PUT /api/campaigns/{id}
pub async fn update(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    ensure_editable(&campaign)?;

    if let Some(name) = &input.name {
        validate_required_text("Campaign name", name, MAX_NAME_LENGTH)?;
    }
    let channel: Channel = campaign.channel.parse()?;
    validate_message_fields(
        &state,
        user.client_id,
        channel,
        input.bot_id,
        input.template_id,
        input.body.as_deref(),
        input.scheduled_at,
    )
    .await?;

    let campaign = CampaignRepo::update_draft(&state.pool, user.client_id, id, &input)
        .await?
        .ok_or_else(|| no_longer_draft(id))?;
    Ok(Json(DataResponse { data: campaign }))
}

/// DELETE /api/campaigns/{id}
pub async fn delete(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    ensure_editable(&campaign)?;

    if CampaignRepo::delete_draft(&state.pool, user.client_id, id).await? {
        tracing::info!(campaign_id = id, client_id = user.client_id, "Campaign draft deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(no_longer_draft(id))
    }
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

/// PUT /api/campaigns/{id}/audience
pub async fn set_audience(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AudienceRequest>,
) -> AppResult<Json<DataResponse<AudienceResponse>>> {
    let selection = if input.select_all {
        let contacts = ContactRepo::selectable(&state.pool, user.client_id).await?;
        let filter = ContactFilter {
            search: input.search,
        };
        AudienceSelection::select_all(&contacts, &filter)
    } else {
        AudienceSelection::from_ids(input.contact_ids)
    };
    let contact_ids: Vec<DbId> = selection.ids().collect();

    let audience_count =
        CampaignRepo::set_audience(&state.pool, user.client_id, id, &contact_ids).await?;
    tracing::debug!(
        campaign_id = id,
        selected = selection.audience_count(),
        audience_count,
        "Campaign audience replaced"
    );
    Ok(Json(DataResponse {
        data: AudienceResponse { audience_count },
    }))
}

/// POST /api/campaigns/{id}/audience/csv
///
/// Imports the uploaded contacts and makes them the campaign's audience.
pub async fn upload_audience_csv(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<CsvAudienceResponse>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    ensure_editable(&campaign)?;

    let parsed = read_csv_upload(multipart).await?;
    if parsed.rows.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "CSV file contains no valid contacts".into(),
        )));
    }

    let summary = ContactRepo::upsert_rows(&state.pool, user.client_id, &parsed.rows).await?;
    let audience_count =
        CampaignRepo::set_audience(&state.pool, user.client_id, id, &summary.contact_ids).await?;

    tracing::info!(
        campaign_id = id,
        client_id = user.client_id,
        audience_count,
        rejected = parsed.rejected.len(),
        "Campaign audience uploaded"
    );
    Ok(Json(DataResponse {
        data: CsvAudienceResponse {
            audience_count,
            inserted: summary.inserted,
            updated: summary.updated,
            rejected: parsed.rejected,
        },
    }))
}

// ---------------------------------------------------------------------------
// Preview / estimate
// ---------------------------------------------------------------------------

/// POST /api/campaigns/{id}/preview
pub async fn preview(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<Json<DataResponse<CampaignPreview>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    let body = effective_body(&state, &campaign).await?.unwrap_or_default();

    let contact = match input.contact_id {
        Some(contact_id) => Some(
            ContactRepo::find_by_id(&state.pool, user.client_id, contact_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Contact",
                    id: contact_id,
                }))?,
        ),
        None => CampaignRepo::audience_contacts(&state.pool, id)
            .await?
            .into_iter()
            .next(),
    };

    let values = contact
        .as_ref()
        .map(|c| resolve_values(&campaign.variable_mapping, &recipient_fields(c)))
        .unwrap_or_default();
    let rendered = render(&body, &values);

    Ok(Json(DataResponse {
        data: CampaignPreview {
            contact_id: contact.map(|c| c.id),
            unmapped_variables: unmapped_variables(&body, &campaign.variable_mapping),
            sms_segments: sms_segment_count(&rendered),
            body,
            rendered,
        },
    }))
}

/// GET /api/campaigns/{id}/estimate
pub async fn estimate(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CampaignEstimate>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    let channel: Channel = campaign.channel.parse()?;
    let rates = state.rates_for_client(user.client_id).await?;
    let estimate = estimate_campaign(channel, campaign.audience_count, &rates)?;

    let balance_cents = WalletRepo::find_by_client(&state.pool, user.client_id)
        .await?
        .map_or(0, |w| w.balance_cents);

    Ok(Json(DataResponse {
        data: CampaignEstimate {
            sufficient_funds: balance_cents >= estimate.total_cents,
            balance_cents,
            estimate,
        },
    }))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/campaigns/{id}/advance
///
/// Gate for the console's wizard: validates the draft through `from` and
/// names the step that follows.
pub async fn advance(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdvanceRequest>,
) -> AppResult<Json<DataResponse<WizardProgress>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    ensure_editable(&campaign)?;
    let draft = wizard_draft(&state, &campaign, campaign.audience_count).await?;
    let next = can_advance(input.from, &draft, Utc::now())?;
    Ok(Json(DataResponse {
        data: WizardProgress {
            completed: input.from,
            next,
        },
    }))
}

/// POST /api/campaigns/{id}/launch
///
/// Renders every recipient, debits the wallet and queues the recipients in
/// one transaction. A future `scheduled_at` makes the campaign `scheduled`;
/// otherwise it starts `running` immediately.
pub async fn launch(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    let current: CampaignStatus = campaign.status.parse()?;
    current.ensure_transition(CampaignStatus::Running)?;

    let channel: Channel = campaign.channel.parse()?;
    if channel == Channel::Rcs {
        if let Some(template_id) = campaign.template_id {
            ensure_usable_template(&state, user.client_id, template_id).await?;
        }
    }

    let contacts = CampaignRepo::audience_contacts(&state.pool, id).await?;
    let now = Utc::now();
    let draft = wizard_draft(&state, &campaign, contacts.len() as i64).await?;
    validate_step(WizardStep::Review, &draft, now)?;
    let body = draft.body.unwrap_or_default();

    let recipients: Vec<NewRecipient> = contacts
        .iter()
        .map(|c| NewRecipient {
            contact_id: Some(c.id),
            phone: c.phone.clone(),
            rendered_body: render(
                &body,
                &resolve_values(&campaign.variable_mapping, &recipient_fields(c)),
            ),
        })
        .collect();

    let rates = state.rates_for_client(user.client_id).await?;
    let estimate = estimate_campaign(channel, recipients.len() as i64, &rates)?;
    let status = match campaign.scheduled_at {
        Some(at) if at > now => CampaignStatus::Scheduled,
        _ => CampaignStatus::Running,
    };

    let launched = CampaignRepo::launch(
        &state.pool,
        user.client_id,
        id,
        &LaunchPlan {
            cost_cents: estimate.total_cents,
            status,
            recipients,
            launched_by: user.user_id,
        },
    )
    .await?;
    Ok(Json(DataResponse { data: launched }))
}

/// POST /api/campaigns/{id}/cancel
pub async fn cancel(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = CampaignRepo::cancel(&state.pool, user.client_id, id, user.user_id).await?;
    tracing::info!(campaign_id = id, cancelled_by = user.user_id, "Campaign cancelled");
    Ok(Json(DataResponse { data: campaign }))
}

/// POST /api/campaigns/{id}/complete
pub async fn complete(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = CampaignRepo::complete(&state.pool, user.client_id, id).await?;
    tracing::info!(campaign_id = id, "Campaign completed");
    Ok(Json(DataResponse { data: campaign }))
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// GET /api/campaigns/{id}/recipients?status=&limit=&offset=
pub async fn list_recipients(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(filter): Query<StatusParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<CampaignRecipient>>>> {
    find_campaign(&state, user.client_id, id).await?;
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<RecipientStatus>)
        .transpose()?;
    let (limit, offset) = page.clamped();
    let recipients =
        CampaignRepo::list_recipients(&state.pool, id, status, limit, offset).await?;
    Ok(Json(DataResponse { data: recipients }))
}

/// PUT /api/campaigns/{id}/recipients/{recipient_id}/status
///
/// Records a delivery receipt. Statuses only move forward.
pub async fn update_recipient_status(
    user: TenantUser,
    State(state): State<AppState>,
    Path((id, recipient_id)): Path<(DbId, DbId)>,
    Json(input): Json<RecipientStatusRequest>,
) -> AppResult<Json<DataResponse<CampaignRecipient>>> {
    let campaign = find_campaign(&state, user.client_id, id).await?;
    let campaign_status: CampaignStatus = campaign.status.parse()?;
    if !matches!(
        campaign_status,
        CampaignStatus::Running | CampaignStatus::Completed
    ) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Delivery receipts are not accepted for a {campaign_status} campaign"
        ))));
    }
    validate_optional_text("Error message", input.error_message.as_deref(), 1_000)?;

    let recipient = CampaignRepo::find_recipient(&state.pool, id, recipient_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recipient",
            id: recipient_id,
        }))?;
    let current: RecipientStatus = recipient.status.parse()?;
    if !current.can_advance_to(input.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Recipient status cannot change from {current} to {}",
            input.status
        ))));
    }

    let error_message = match input.status {
        RecipientStatus::Failed => input.error_message.as_deref(),
        _ => None,
    };
    let updated = CampaignRepo::update_recipient_status(
        &state.pool,
        id,
        recipient_id,
        current,
        input.status,
        error_message,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Recipient {recipient_id} changed status concurrently; reload and retry"
        )))
    })?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_campaign(state: &AppState, client_id: DbId, id: DbId) -> AppResult<Campaign> {
    CampaignRepo::find_by_id(&state.pool, client_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))
}

fn ensure_editable(campaign: &Campaign) -> AppResult<()> {
    let status: CampaignStatus = campaign.status.parse()?;
    if status.is_editable() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Conflict(format!(
            "Only draft campaigns can be changed (campaign is {status})"
        ))))
    }
}

fn no_longer_draft(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Campaign {id} is no longer a draft"
    )))
}

/// Check optional draft fields against the campaign's channel.
async fn validate_message_fields(
    state: &AppState,
    client_id: DbId,
    channel: Channel,
    bot_id: Option<DbId>,
    template_id: Option<DbId>,
    body: Option<&str>,
    scheduled_at: Option<Timestamp>,
) -> AppResult<()> {
    if let Some(body) = body {
        validate_body(channel, body)?;
    }
    if let Some(at) = scheduled_at {
        if at <= Utc::now() {
            return Err(AppError::Core(CoreError::Validation(
                "Scheduled time must be in the future".into(),
            )));
        }
    }
    if let Some(bot_id) = bot_id {
        BotRepo::find_by_id(&state.pool, client_id, channel, bot_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "No {channel} sender with id {bot_id}"
                )))
            })?;
    }
    if let Some(template_id) = template_id {
        if channel != Channel::Rcs {
            return Err(AppError::Core(CoreError::Validation(
                "Templates can only be used with RCS campaigns".into(),
            )));
        }
        RcsTemplateRepo::find_by_id(&state.pool, client_id, template_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "RCS template",
                id: template_id,
            }))?;
    }
    Ok(())
}

/// The wizard's view of a stored campaign.
async fn wizard_draft(
    state: &AppState,
    campaign: &Campaign,
    audience_count: i64,
) -> AppResult<CampaignDraft> {
    Ok(CampaignDraft {
        name: campaign.name.clone(),
        channel: Some(campaign.channel.parse()?),
        audience_count,
        body: effective_body(state, campaign).await?,
        variable_mapping: campaign.variable_mapping.0.clone(),
        scheduled_at: campaign.scheduled_at,
    })
}

/// The campaign's own body, or the body of its RCS template.
async fn effective_body(state: &AppState, campaign: &Campaign) -> AppResult<Option<String>> {
    if campaign.body.is_some() {
        return Ok(campaign.body.clone());
    }
    let Some(template_id) = campaign.template_id else {
        return Ok(None);
    };
    let template = RcsTemplateRepo::find_by_id(&state.pool, campaign.client_id, template_id).await?;
    Ok(template.map(|t| t.body))
}

async fn ensure_usable_template(
    state: &AppState,
    client_id: DbId,
    template_id: DbId,
) -> AppResult<()> {
    let template = RcsTemplateRepo::find_by_id(&state.pool, client_id, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RCS template",
            id: template_id,
        }))?;
    let status: TemplateStatus = template.status.parse()?;
    if !status.is_usable() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "RCS template {template_id} is {status}; only approved templates can be sent"
        ))));
    }
    Ok(())
}

fn recipient_fields(contact: &Contact) -> RecipientFields<'_> {
    RecipientFields {
        name: contact.name.as_deref(),
        phone: &contact.phone,
        email: contact.email.as_deref(),
        attributes: &contact.attributes.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_request_defaults_to_explicit_ids() {
        let req: AudienceRequest = serde_json::from_str(r#"{"contact_ids":[3,1]}"#).unwrap();
        assert!(!req.select_all);
        assert_eq!(req.contact_ids, vec![3, 1]);
    }

    #[test]
    fn recipient_status_request_uses_snake_case() {
        let req: RecipientStatusRequest =
            serde_json::from_str(r#"{"status":"delivered"}"#).unwrap();
        assert_eq!(req.status, RecipientStatus::Delivered);
        assert!(req.error_message.is_none());
    }

    #[test]
    fn recipient_fields_borrow_contact_columns() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("order_id".into(), serde_json::json!("A-17"));
        let contact = Contact {
            id: 7,
            client_id: 1,
            name: Some("Asha".into()),
            phone: "+919800000001".into(),
            email: None,
            attributes: sqlx::types::Json(attributes),
            opted_out: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let fields = recipient_fields(&contact);
        assert_eq!(fields.name, Some("Asha"));
        assert_eq!(fields.phone, "+919800000001");
        assert_eq!(fields.attributes.get("order_id"), Some(&serde_json::json!("A-17")));
    }
}
