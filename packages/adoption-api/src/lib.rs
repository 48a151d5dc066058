//! REST client for the pet-adoption platform API.
//!
//! Wraps the platform's HTTP endpoints (auth, users, pets, volunteer,
//! adoption and adopter applications). Every endpoint except sign-in answers
//! with the uniform envelope `{statusCode, success, message, data,
//! detailErrors}`; the client unwraps it and turns refusals into
//! [`ApiError`] values.
//!
//! # Example
//!
//! ```rust,ignore
//! use adoption_api::{AdoptionApiClient, SignInRequest};
//!
//! let client = AdoptionApiClient::new("https://api.example.org/api");
//! let auth = client
//!     .sign_in(&SignInRequest { email: "a@b.com".into(), password: "secret".into() })
//!     .await?;
//!
//! let pets = client.with_token(auth.token).get_all_pets().await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ApiError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default request timeout, matching what the web client used.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const SIGN_IN: &str = "/auth/login";
    pub const SIGN_UP: &str = "/auth/send-confirmation";
    pub const CONFIRM_EMAIL: &str = "/confirm-email";
    pub const SELF_INFO: &str = "/users/self-info";
    pub const USERS: &str = "/users";
    pub const ALL_PETS: &str = "/Pets";
    pub const PETS: &str = "/pets";
    pub const VOLUNTEER_APPLICATIONS: &str = "/volunteer-applications";
    pub const ADOPTION_APPLICATIONS: &str = "/adoption-applications";
    pub const ADOPTER_APPLICATIONS: &str = "/adopter-applications";
}

/// Adoption platform API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct AdoptionApiClient {
    http_client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl AdoptionApiClient {
    /// Create a client for the given base URL with the default timeout.
    ///
    /// If the HTTP client cannot be built with a timeout, falls back to
    /// reqwest's defaults and logs a warning. Use [`Self::with_timeout`] to
    /// surface that error instead.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        match Self::with_timeout(base_url.clone(), DEFAULT_TIMEOUT) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Self {
                    http_client: Client::new(),
                    base_url: base_url.trim_end_matches('/').to_string(),
                    auth_token: None,
                }
            }
        }
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Exchange credentials for an access token.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<AuthResponse> {
        let req = self.request(Method::POST, endpoints::SIGN_IN).json(request);
        self.send_json(req).await
    }

    /// Register an account; the server mails a confirmation link.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        let req = self.request(Method::POST, endpoints::SIGN_UP).json(request);
        self.send_unit(req).await
    }

    pub async fn confirm_email(&self, token: &str) -> Result<()> {
        let req = self
            .request(Method::GET, endpoints::CONFIRM_EMAIL)
            .query(&[("token", token)]);
        self.send_unit(req).await
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Fetch the full profile of the signed-in user.
    pub async fn get_self_info(&self, user_id: &str) -> Result<UserProfile> {
        let path = format!("{}/{}", endpoints::SELF_INFO, user_id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn update_avatar(&self, user_id: i64, profile_picture: &str) -> Result<()> {
        let path = format!("{}/{}/avatar", endpoints::USERS, user_id);
        let body = AvatarUpdate {
            profile_picture: profile_picture.to_string(),
        };
        self.send_unit(self.request(Method::PUT, &path).json(&body))
            .await
    }

    // ------------------------------------------------------------------------
    // Pets
    // ------------------------------------------------------------------------

    /// Fetch the full pet catalog.
    pub async fn get_all_pets(&self) -> Result<Vec<Pet>> {
        let page: Page<Pet> = self
            .send_envelope(self.request(Method::GET, endpoints::ALL_PETS))
            .await?;
        debug!(count = page.items.len(), "Fetched pet catalog");
        Ok(page.items)
    }

    pub async fn get_pet(&self, pet_id: i64) -> Result<Pet> {
        let path = format!("{}/{}", endpoints::PETS, pet_id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn get_pet_by_slug(&self, slug: &str) -> Result<Pet> {
        let path = format!("{}/slug/{}", endpoints::PETS, slug);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    /// Pets posted by a user, optionally narrowed to a listing status.
    pub async fn get_user_pets(&self, user_id: i64, status: Option<&str>) -> Result<Vec<Pet>> {
        let path = format!("{}/user/{}", endpoints::PETS, user_id);
        let mut req = self.request(Method::GET, &path);
        if let Some(status) = status {
            req = req.query(&[("status", status)]);
        }
        let page: Page<Pet> = self.send_envelope(req).await?;
        Ok(page.items)
    }

    pub async fn create_pet(&self, input: &PetInput) -> Result<Pet> {
        let req = self.request(Method::POST, endpoints::PETS).json(input);
        self.send_envelope(req).await
    }

    pub async fn update_pet(&self, pet_id: i64, input: &PetInput) -> Result<Pet> {
        let path = format!("{}/{}", endpoints::PETS, pet_id);
        self.send_envelope(self.request(Method::PUT, &path).json(input))
            .await
    }

    pub async fn delete_pet(&self, pet_id: i64) -> Result<()> {
        let path = format!("{}/{}", endpoints::PETS, pet_id);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    /// Record a staff verification decision for a listing.
    pub async fn verify_pet(&self, pet_id: i64, is_approved: bool) -> Result<()> {
        let path = format!("{}/{}/verification", endpoints::PETS, pet_id);
        let body = VerificationDecision { is_approved };
        self.send_unit(self.request(Method::PATCH, &path).json(&body))
            .await
    }

    // ------------------------------------------------------------------------
    // Volunteer applications
    // ------------------------------------------------------------------------

    pub async fn list_volunteer_applications(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<VolunteerApplication>> {
        let req = self
            .request(Method::GET, endpoints::VOLUNTEER_APPLICATIONS)
            .query(&[("PageNumber", page_number), ("PageSize", page_size)]);
        self.send_envelope(req).await
    }

    pub async fn get_volunteer_application(&self, id: i64) -> Result<VolunteerApplication> {
        let path = format!("{}/{}", endpoints::VOLUNTEER_APPLICATIONS, id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn my_volunteer_applications(
        &self,
        user_id: i64,
    ) -> Result<Vec<VolunteerApplication>> {
        let path = format!("{}/user/{}", endpoints::VOLUNTEER_APPLICATIONS, user_id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn create_volunteer_application(
        &self,
        request: &VolunteerApplicationRequest,
    ) -> Result<VolunteerApplication> {
        let req = self
            .request(Method::POST, endpoints::VOLUNTEER_APPLICATIONS)
            .json(request);
        self.send_envelope(req).await
    }

    pub async fn update_volunteer_application(
        &self,
        id: i64,
        request: &VolunteerApplicationRequest,
    ) -> Result<VolunteerApplication> {
        let path = format!("{}/{}", endpoints::VOLUNTEER_APPLICATIONS, id);
        self.send_envelope(self.request(Method::PUT, &path).json(request))
            .await
    }

    pub async fn update_volunteer_application_status(&self, id: i64, status: &str) -> Result<()> {
        let path = format!("{}/{}/status", endpoints::VOLUNTEER_APPLICATIONS, id);
        let body = StatusUpdate {
            status: status.to_string(),
        };
        self.send_unit(self.request(Method::PATCH, &path).json(&body))
            .await
    }

    pub async fn delete_volunteer_application(&self, id: i64) -> Result<()> {
        let path = format!("{}/{}", endpoints::VOLUNTEER_APPLICATIONS, id);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    // ------------------------------------------------------------------------
    // Adoption applications
    // ------------------------------------------------------------------------

    pub async fn list_adoption_applications(&self) -> Result<Vec<AdoptionApplication>> {
        let page: Page<AdoptionApplication> = self
            .send_envelope(self.request(Method::GET, endpoints::ADOPTION_APPLICATIONS))
            .await?;
        Ok(page.items)
    }

    pub async fn get_adoption_application(&self, id: i64) -> Result<AdoptionApplication> {
        let path = format!("{}/{}", endpoints::ADOPTION_APPLICATIONS, id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn create_adoption_application(
        &self,
        request: &AdoptionApplicationRequest,
    ) -> Result<AdoptionApplication> {
        let req = self
            .request(Method::POST, endpoints::ADOPTION_APPLICATIONS)
            .json(request);
        self.send_envelope(req).await
    }

    // ------------------------------------------------------------------------
    // Adopter (verified adopter) applications
    // ------------------------------------------------------------------------

    pub async fn list_adopter_applications(&self) -> Result<Vec<AdopterApplication>> {
        let page: Page<AdopterApplication> = self
            .send_envelope(self.request(Method::GET, endpoints::ADOPTER_APPLICATIONS))
            .await?;
        Ok(page.items)
    }

    pub async fn get_adopter_application(&self, id: i64) -> Result<AdopterApplication> {
        let path = format!("{}/{}", endpoints::ADOPTER_APPLICATIONS, id);
        self.send_envelope(self.request(Method::GET, &path)).await
    }

    pub async fn create_adopter_application(
        &self,
        request: &AdopterApplicationRequest,
    ) -> Result<AdopterApplication> {
        let req = self
            .request(Method::POST, endpoints::ADOPTER_APPLICATIONS)
            .json(request);
        self.send_envelope(req).await
    }

    // ------------------------------------------------------------------------
    // Transport helpers
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send and return the raw body of a 2xx response.
    async fn send_raw(&self, req: RequestBuilder) -> Result<Vec<u8>> {
        let response = req.send().await.map_err(|e| {
            warn!(error = %e, "Adoption API request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                warn!("Unauthorized response from adoption API");
            }
            let message = error_message(&body);
            warn!(status = %status, error = %message, "Adoption API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let body = self.send_raw(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_envelope<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let envelope: ApiEnvelope<T> = self.send_json(req).await?;
        envelope.into_data()
    }

    /// Endpoints whose payload is ignored; an empty 2xx body counts as success.
    async fn send_unit(&self, req: RequestBuilder) -> Result<()> {
        let body = self.send_raw(req).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&body)?;
        envelope.into_unit()
    }
}

/// Pull the most useful message out of an error body: the envelope's
/// `message` when present, otherwise the raw text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}
