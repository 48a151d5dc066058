//! Request and response types for the adoption platform API.
//!
//! Field names follow the server's camelCase JSON. Most response fields are
//! optional because the API omits what a given screen does not need.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

// ============================================================================
// Envelope
// ============================================================================

/// Uniform wrapper the API puts around every non-auth response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub detail_errors: Option<Value>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ApiError::Rejected`].
    ///
    /// An envelope that refuses the request without a status code is treated
    /// as a 400.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(ApiError::Rejected {
                status_code: self.status_code.unwrap_or(400),
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// Like [`into_data`](Self::into_data) but for endpoints whose payload is
    /// irrelevant (deletes, status patches).
    pub fn into_unit(self) -> Result<()> {
        if !self.success {
            return Err(ApiError::Rejected {
                status_code: self.status_code.unwrap_or(400),
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Paged list payload (`data.items`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Accepts a JSON string or number and keeps it as text.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of a successful `POST /auth/login`. Not wrapped in an envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthUser {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

// ============================================================================
// Users
// ============================================================================

/// Full profile returned by the self-info endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<String>,
    pub occupation: Option<String>,
    pub description: Option<String>,
    pub hobby: Option<String>,
    pub is_verified_adopter: Option<bool>,
    pub adopter_since: Option<String>,
    pub is_ready_to_adopt: Option<bool>,
    pub role: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpdate {
    pub profile_picture: String,
}

// ============================================================================
// Pets
// ============================================================================

/// Staff verification state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[serde(alias = "pending")]
    PendingVerification,
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub pet_id: i64,
    pub pet_name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, alias = "breed")]
    pub breed_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: Option<String>,
    #[serde(default)]
    pub age_unit: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub is_vaccinated: bool,
    #[serde(default)]
    pub is_neutered: bool,
    #[serde(default)]
    pub is_trained: bool,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub adoption_status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_date: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
}

/// Body for creating or updating a pet listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetInput {
    pub pet_name: String,
    pub category_id: Option<i64>,
    pub breed_id: Option<i64>,
    pub age: Option<String>,
    pub age_unit: Option<String>,
    pub gender: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub health_status: Option<String>,
    pub personality: Option<String>,
    pub is_vaccinated: bool,
    pub is_neutered: bool,
    pub is_trained: bool,
    pub location: Option<String>,
    pub primary_image_url: Option<String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDecision {
    pub is_approved: bool,
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerApplication {
    #[serde(alias = "id")]
    pub application_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    /// Form answers the client does not interpret.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerApplicationRequest {
    pub user_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub availability: Option<String>,
    pub motivation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionApplication {
    #[serde(alias = "id")]
    pub application_id: i64,
    #[serde(default)]
    pub pet_id: Option<i64>,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, alias = "applicationStatus")]
    pub status: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionApplicationRequest {
    pub pet_id: i64,
    pub user_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub reason_for_adoption: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Verified-adopter application submitted from the profile screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdopterApplicationRequest {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub id_card_number: String,
    pub occupation: String,
    pub income: String,
    pub living_conditions: String,
    pub housing_type: String,
    pub has_experience: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_pets: Option<String>,
    pub family_support: String,
    pub work_schedule: String,
    pub reason_for_adoption: String,
    pub preferred_pet_types: String,
    pub created_date: String,
    pub id_card_front_image_url: String,
    pub id_card_back_image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdopterApplication {
    pub application_id: i64,
    pub application_status: String,
    #[serde(flatten)]
    pub request: AdopterApplicationRequest,
}
