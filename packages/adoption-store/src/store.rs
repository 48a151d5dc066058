//! The application store.
//!
//! State changes only through pure reducers. Effects obtain a [`Ticket`]
//! before doing I/O and commit through it afterwards; a ticket that is no
//! longer the latest for its key, or that predates a logout, commits
//! nothing. The check and the reduction happen under one lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::catalog::{self, CatalogAction, CatalogState};
use crate::credentials::CredentialStore;
use crate::intent::IntentKey;
use crate::session::{self, SessionAction, SessionState, UserInfo};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: SessionState,
    pub catalog: CatalogState,
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    Session(SessionAction),
    Catalog(CatalogAction),
}

impl From<SessionAction> for StoreAction {
    fn from(action: SessionAction) -> Self {
        StoreAction::Session(action)
    }
}

impl From<CatalogAction> for StoreAction {
    fn from(action: CatalogAction) -> Self {
        StoreAction::Catalog(action)
    }
}

/// Which part of the state a committed reduction touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Session,
    Catalog,
}

/// Emitted after every committed reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub version: u64,
    pub slice: Slice,
}

/// Claim on the right to commit one effect's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub key: IntentKey,
    pub generation: u64,
    pub epoch: u64,
}

#[derive(Debug, Default)]
struct Inner {
    state: AppState,
    epoch: u64,
    version: u64,
    generations: HashMap<IntentKey, u64>,
}

impl Inner {
    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
            && self.generations.get(&ticket.key).copied() == Some(ticket.generation)
    }

    fn apply(&mut self, action: StoreAction) -> StoreEvent {
        let state = std::mem::take(&mut self.state);
        let slice = match action {
            StoreAction::Session(action) => {
                self.state = AppState {
                    session: session::reduce(state.session, action),
                    catalog: state.catalog,
                };
                Slice::Session
            }
            StoreAction::Catalog(action) => {
                self.state = AppState {
                    session: state.session,
                    catalog: catalog::reduce(state.catalog, action),
                };
                Slice::Catalog
            }
        };
        self.version += 1;
        StoreEvent {
            version: self.version,
            slice,
        }
    }
}

pub struct Store {
    inner: RwLock<Inner>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: RwLock::new(Inner {
                state,
                ..Default::default()
            }),
            events,
        }
    }

    /// Build the initial store from the persisted token.
    ///
    /// A valid token yields an authenticated session with claims before any
    /// network call; anything else yields an anonymous one and a cleared
    /// token.
    pub async fn restore(credentials: &CredentialStore, now: DateTime<Utc>) -> Self {
        let session = match credentials.restore(now).await {
            Some((_, claims)) => SessionState::Authenticated {
                user: UserInfo::from_claims(claims),
            },
            None => SessionState::Anonymous,
        };

        Self::with_state(AppState {
            session,
            ..Default::default()
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the newest ticket for `key`, superseding every earlier one.
    pub fn begin(&self, key: impl Into<IntentKey>) -> Ticket {
        let key = key.into();
        let mut inner = self.write();
        let epoch = inner.epoch;
        let generation = inner.generations.entry(key).or_insert(0);
        *generation += 1;

        Ticket {
            key,
            generation: *generation,
            epoch,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.read().is_current(ticket)
    }

    /// Apply `action` if `ticket` is still current. Returns whether it was.
    pub fn commit(&self, ticket: &Ticket, action: impl Into<StoreAction>) -> bool {
        let action = action.into();
        self.commit_with(ticket, move |_| action)
    }

    /// Like [`Store::commit`], with the action derived from the state seen
    /// under the lock.
    pub fn commit_with<F>(&self, ticket: &Ticket, derive: F) -> bool
    where
        F: FnOnce(&AppState) -> StoreAction,
    {
        let event = {
            let mut inner = self.write();
            if !inner.is_current(ticket) {
                debug!(
                    intent = %ticket.key.kind,
                    generation = ticket.generation,
                    epoch = ticket.epoch,
                    "Discarding superseded result"
                );
                return false;
            }
            let action = derive(&inner.state);
            inner.apply(action)
        };

        let _ = self.events.send(event);
        true
    }

    /// Close the session: reset identity and invalidate every ticket issued
    /// so far.
    pub fn end_session(&self) {
        let event = {
            let mut inner = self.write();
            inner.epoch += 1;
            inner.apply(SessionAction::LoggedOut.into())
        };

        let _ = self.events.send(event);
    }

    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> AppState {
        self.read().state.clone()
    }

    /// Run a selector against the current state without cloning it.
    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        selector(&self.read().state)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
