use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Persistent intelligence record for each employer company.
/// One record per (company_name, tenant); enriched over time as bookings
/// are confirmed. tenant_id is NULL for the default tenant.
///
/// The list-valued AI fields are JSONB columns decoded once at the storage
/// boundary, so everything downstream works with native `Vec<String>`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmployerProfile {
    pub id: Uuid,

    pub user_id: Option<Uuid>,
    pub company_name: String,
    pub website_url: Option<String>,
    pub primary_contact_email: Option<String>,
    pub phone: Option<String>,

    pub ai_industry: Option<String>,
    pub ai_company_size: Option<String>,
    pub ai_company_overview: Option<String>,
    pub ai_hiring_needs: Json<Vec<String>>,
    pub ai_talking_points: Json<Vec<String>>,
    pub ai_red_flags: Option<String>,
    pub ai_brief_raw: Option<String>,
    pub ai_brief_updated_at: Option<DateTime<Utc>>,

    pub recruiter_notes: Option<String>,
    /// prospect | active_client | placed | inactive | not_a_fit
    pub relationship_status: Option<String>,

    pub tenant_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
