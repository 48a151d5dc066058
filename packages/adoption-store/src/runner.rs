//! Effect runner: one async handler per intent.
//!
//! Handlers catch every failure at their boundary. The worst outcome of a
//! failed effect is stale state, never a panic or a half-written session.

use std::sync::Arc;

use adoption_api::SignInRequest;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::catalog::{self, CatalogAction};
use crate::claims;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::gateway::BaseApiGateway;
use crate::intent::{EffectOutcome, Intent, IntentId, IntentKey, IntentKind};
use crate::session::SessionAction;
use crate::store::{Store, StoreAction, Ticket};

pub struct EffectRunner {
    store: Arc<Store>,
    gateway: Arc<dyn BaseApiGateway>,
    credentials: CredentialStore,
    /// Serializes token writes with session commits.
    session_gate: Mutex<()>,
    in_flight: DashMap<IntentKey, AbortHandle>,
    clock: fn() -> DateTime<Utc>,
}

impl EffectRunner {
    pub fn new(
        store: Arc<Store>,
        gateway: Arc<dyn BaseApiGateway>,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            store,
            gateway,
            credentials,
            session_gate: Mutex::new(()),
            in_flight: DashMap::new(),
            clock: Utc::now,
        }
    }

    /// Replace the clock used to check token expiry at sign-in.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Run an intent as a background task.
    ///
    /// The ticket is taken here, before the task is spawned, so same-key
    /// intents are ordered by dispatch rather than by when their tasks
    /// first get polled. A newer dispatch of the same key aborts the
    /// previous task when its kind allows it; otherwise the older result
    /// is discarded at commit.
    pub fn dispatch(self: &Arc<Self>, intent: Intent) -> JoinHandle<EffectOutcome> {
        let key = intent.key();
        let ticket = self.store.begin(key);
        let runner = Arc::clone(self);
        let handle = tokio::spawn(async move { runner.run_with_ticket(intent, ticket).await });

        if key.kind.is_abortable() {
            if let Some(previous) = self.in_flight.insert(key, handle.abort_handle()) {
                debug!(intent = %key.kind, "Aborting superseded task");
                previous.abort();
            }
        }

        handle
    }

    /// Run an intent to completion on the current task.
    pub async fn run(&self, intent: Intent) -> EffectOutcome {
        let ticket = self.store.begin(intent.key());
        self.run_with_ticket(intent, ticket).await
    }

    async fn run_with_ticket(&self, intent: Intent, ticket: Ticket) -> EffectOutcome {
        let kind = intent.kind();
        let span = info_span!("effect", intent = %kind, intent_id = %IntentId::new());

        async move {
            match intent {
                Intent::SignIn(request) => match self.sign_in_with_ticket(ticket, request).await {
                    Ok(()) => EffectOutcome::Applied,
                    Err(AuthError::Superseded) => EffectOutcome::Superseded,
                    Err(e) => EffectOutcome::Failed(e.to_string()),
                },
                Intent::Logout => {
                    self.logout().await;
                    EffectOutcome::Applied
                }
                Intent::FetchUserLogin { token } => {
                    self.fetch_user_login_with_ticket(ticket, &token).await
                }
                Intent::GetAllPets => self.get_all_pets_with_ticket(ticket).await,
                Intent::GetPetsNeedingVerification => {
                    self.get_pets_needing_verification_with_ticket(ticket)
                }
                Intent::VerifyPet {
                    pet_id,
                    is_approved,
                } => self.verify_pet_with_ticket(ticket, pet_id, is_approved).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Check the persisted session at startup.
    ///
    /// A valid token refreshes the profile, an unusable one logs out, no
    /// token does nothing. Restoring uses its own key, so a sign-in in
    /// flight at the same time is left alone.
    pub async fn bootstrap(&self, now: DateTime<Utc>) -> EffectOutcome {
        let Some(token) = self.credentials.load().await else {
            debug!("No persisted session");
            return EffectOutcome::Skipped;
        };

        match claims::decode_valid_token(&token, now) {
            Ok(claims) => {
                if !self.store.select(|s| s.session.is_authenticated()) {
                    let ticket = self.store.begin(IntentKind::RestoreSession);
                    self.store.commit(&ticket, SessionAction::SignedIn(claims));
                }
                self.run(Intent::FetchUserLogin { token }).await
            }
            Err(e) => {
                info!(error = %e, "Persisted session is no longer valid, logging out");
                self.run(Intent::Logout).await
            }
        }
    }

    /// Sign in and persist the session.
    ///
    /// A token that is already expired, or carries no expiry, is refused
    /// before anything is written.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<(), AuthError> {
        let ticket = self.store.begin(IntentKind::SignIn);
        self.sign_in_with_ticket(ticket, request).await
    }

    async fn sign_in_with_ticket(
        &self,
        ticket: Ticket,
        request: SignInRequest,
    ) -> Result<(), AuthError> {
        let response = match self.gateway.sign_in(&request).await {
            Ok(response) => response,
            Err(e) => {
                let err = AuthError::from(e);
                if err.is_rejected() {
                    info!(error = %err, "Sign-in rejected");
                } else {
                    error!(error = %err, "Sign-in failed");
                }
                return Err(err);
            }
        };

        let claims = claims::decode_valid_token(&response.token, (self.clock)())
            .map_err(|e| {
                error!(error = %e, "Sign-in returned an unusable token");
                AuthError::from(e)
            })?;

        {
            let _gate = self.session_gate.lock().await;

            if !self.store.is_current(&ticket) {
                info!("Sign-in superseded before persisting");
                return Err(AuthError::Superseded);
            }

            self.credentials.save(&response.token).await.map_err(|e| {
                error!(error = %e, "Failed to persist token");
                AuthError::from(e)
            })?;

            if !self.store.commit(&ticket, SessionAction::SignedIn(claims)) {
                // The gate is still held, so no newer session has written a token.
                if let Err(e) = self.credentials.clear().await {
                    warn!(error = %e, "Failed to roll back token");
                }
                return Err(AuthError::Superseded);
            }
        }

        info!("Signed in");
        self.fetch_user_login(&response.token).await;
        Ok(())
    }

    /// Always succeeds locally. Every outstanding result becomes stale.
    pub async fn logout(&self) {
        let _gate = self.session_gate.lock().await;

        self.store.end_session();
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "Failed to clear persisted token");
        }

        info!("Logged out");
    }

    pub async fn fetch_user_login(&self, token: &str) -> EffectOutcome {
        let ticket = self.store.begin(IntentKind::FetchUserLogin);
        self.fetch_user_login_with_ticket(ticket, token).await
    }

    async fn fetch_user_login_with_ticket(&self, ticket: Ticket, token: &str) -> EffectOutcome {

        let claims = match claims::decode_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Cannot decode token for profile fetch");
                return EffectOutcome::Failed(e.to_string());
            }
        };
        let Some(user_id) = claims.identity_key() else {
            warn!("Token carries no user id");
            return EffectOutcome::Failed("token carries no user id".into());
        };

        match self.gateway.get_self_info(user_id, token).await {
            Ok(profile) => {
                debug!(user_id, "Fetched profile");
                self.commit(&ticket, SessionAction::ProfileLoaded(profile))
            }
            Err(e) => {
                if e.is_unauthorized() {
                    warn!(user_id, "Profile fetch unauthorized");
                } else {
                    error!(error = %e, user_id, "Profile fetch failed");
                }
                EffectOutcome::Failed(e.message())
            }
        }
    }

    pub async fn get_all_pets(&self) -> EffectOutcome {
        let ticket = self.store.begin(IntentKind::GetAllPets);
        self.get_all_pets_with_ticket(ticket).await
    }

    async fn get_all_pets_with_ticket(&self, ticket: Ticket) -> EffectOutcome {

        match self.gateway.get_all_pets().await {
            Ok(pets) => {
                debug!(count = pets.len(), "Fetched pets");
                self.commit(&ticket, CatalogAction::SetCollection(pets))
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch pets");
                EffectOutcome::Failed(e.message())
            }
        }
    }

    /// Derived from the loaded collection; no network call.
    pub fn get_pets_needing_verification(&self) -> EffectOutcome {
        let ticket = self.store.begin(IntentKind::GetPetsNeedingVerification);
        self.get_pets_needing_verification_with_ticket(ticket)
    }

    fn get_pets_needing_verification_with_ticket(&self, ticket: Ticket) -> EffectOutcome {

        let committed = self.store.commit_with(&ticket, |state| {
            CatalogAction::SetVerificationQueue(catalog::verification_queue(&state.catalog.pets))
                .into()
        });

        if committed {
            EffectOutcome::Applied
        } else {
            EffectOutcome::Superseded
        }
    }

    /// Remote decision first; the local update follows only on success.
    pub async fn verify_pet(&self, pet_id: i64, is_approved: bool) -> EffectOutcome {
        let ticket = self.store.begin(IntentKey {
            kind: IntentKind::VerifyPet,
            scope: Some(pet_id),
        });
        self.verify_pet_with_ticket(ticket, pet_id, is_approved).await
    }

    async fn verify_pet_with_ticket(
        &self,
        ticket: Ticket,
        pet_id: i64,
        is_approved: bool,
    ) -> EffectOutcome {
        let token = self.credentials.load().await;

        match self
            .gateway
            .verify_pet(pet_id, is_approved, token.as_deref())
            .await
        {
            Ok(()) => {
                info!(pet_id, is_approved, "Recorded verification decision");
                self.commit(
                    &ticket,
                    CatalogAction::ApplyVerificationDecision {
                        pet_id,
                        is_approved,
                    },
                )
            }
            Err(e) => {
                error!(error = %e, pet_id, "Verification failed");
                EffectOutcome::Failed(e.message())
            }
        }
    }

    fn commit(
        &self,
        ticket: &Ticket,
        action: impl Into<StoreAction>,
    ) -> EffectOutcome {
        if self.store.commit(ticket, action) {
            EffectOutcome::Applied
        } else {
            EffectOutcome::Superseded
        }
    }
}
