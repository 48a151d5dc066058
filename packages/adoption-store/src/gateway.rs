//! The remote calls the runner depends on.

use adoption_api::{AdoptionApiClient, AuthResponse, Pet, SignInRequest, UserProfile};
use async_trait::async_trait;

/// API operations used by effects. Implemented by the HTTP client and by
/// test doubles.
#[async_trait]
pub trait BaseApiGateway: Send + Sync {
    async fn sign_in(&self, request: &SignInRequest) -> adoption_api::Result<AuthResponse>;

    async fn get_self_info(&self, user_id: &str, token: &str)
        -> adoption_api::Result<UserProfile>;

    async fn get_all_pets(&self) -> adoption_api::Result<Vec<Pet>>;

    async fn verify_pet(
        &self,
        pet_id: i64,
        is_approved: bool,
        token: Option<&str>,
    ) -> adoption_api::Result<()>;
}

#[async_trait]
impl BaseApiGateway for AdoptionApiClient {
    async fn sign_in(&self, request: &SignInRequest) -> adoption_api::Result<AuthResponse> {
        AdoptionApiClient::sign_in(self, request).await
    }

    async fn get_self_info(
        &self,
        user_id: &str,
        token: &str,
    ) -> adoption_api::Result<UserProfile> {
        self.clone().with_token(token).get_self_info(user_id).await
    }

    async fn get_all_pets(&self) -> adoption_api::Result<Vec<Pet>> {
        AdoptionApiClient::get_all_pets(self).await
    }

    async fn verify_pet(
        &self,
        pet_id: i64,
        is_approved: bool,
        token: Option<&str>,
    ) -> adoption_api::Result<()> {
        match token {
            Some(token) => {
                self.clone()
                    .with_token(token)
                    .verify_pet(pet_id, is_approved)
                    .await
            }
            None => AdoptionApiClient::verify_pet(self, pet_id, is_approved).await,
        }
    }
}
