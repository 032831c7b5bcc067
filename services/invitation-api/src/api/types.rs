use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wedding_tenant_resolver::TenantRecord;

use crate::countdown::Countdown;
use crate::storage::{GuestRecord, PhotoRecord, RsvpStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantQuery {
    pub tenant: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvePathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceQuery {
    pub tenant: Option<String>,
    pub visitor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTenantsQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingConfigResponse {
    pub slug: String,
    pub name: String,
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownResponse {
    pub slug: String,
    pub wedding_date: DateTime<Utc>,
    #[serde(flatten)]
    pub countdown: Countdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub guest_id: String,
    pub name: String,
    pub email: Option<String>,
    pub max_party_size: u32,
    pub rsvp_status: RsvpStatus,
    pub party_size: Option<u32>,
    pub message: Option<String>,
    pub responded_at: Option<String>,
}

impl From<GuestRecord> for GuestResponse {
    fn from(record: GuestRecord) -> Self {
        Self {
            guest_id: record.guest_id,
            name: record.name,
            email: record.email,
            max_party_size: record.max_party_size,
            rsvp_status: record.rsvp_status,
            party_size: record.party_size,
            message: record.message,
            responded_at: record.responded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestRequest {
    pub tenant: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub max_party_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRequest {
    pub tenant: Option<String>,
    pub guest_id: String,
    pub attending: bool,
    pub party_size: Option<u32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub photo_id: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i64,
    pub taken_at: DateTime<Utc>,
}

impl From<PhotoRecord> for PhotoResponse {
    fn from(record: PhotoRecord) -> Self {
        Self {
            photo_id: record.photo_id,
            url: record.url,
            caption: record.caption,
            display_order: record.display_order,
            taken_at: record.taken_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhotoRequest {
    pub tenant: Option<String>,
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: i64,
    pub taken_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceValue {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritePreferenceRequest {
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub slug: String,
    pub name: String,
    pub config: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub config: Option<Value>,
}

pub type TenantResponse = TenantRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default)]
    pub details: Option<Value>,
}
