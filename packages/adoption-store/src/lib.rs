//! Session-aware state container for the adoption client.
//!
//! ```text
//! Intent → EffectRunner → API gateway → Ticket commit → reducer → StoreEvent
//! ```
//!
//! - Reducers in [`session`] and [`catalog`] are pure.
//! - [`EffectRunner`] owns all I/O and commits through [`Store`] tickets, so
//!   a newer intent of the same kind, or a logout, discards stale results.
//! - [`selectors`] are read-only projections for the UI.

pub mod catalog;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod runner;
pub mod selectors;
pub mod session;
pub mod store;

pub use catalog::{CatalogAction, CatalogState};
pub use claims::{decode_token, Claims};
pub use config::StoreConfig;
pub use credentials::{CredentialStore, FileStorage, MemoryStorage, TokenStorage, ACCESS_TOKEN_KEY};
pub use error::{AuthError, StorageError, TokenError};
pub use gateway::BaseApiGateway;
pub use intent::{EffectOutcome, Intent, IntentId, IntentKey, IntentKind};
pub use runner::EffectRunner;
pub use session::{SessionAction, SessionState, UserInfo};
pub use store::{AppState, Slice, Store, StoreAction, StoreEvent, Ticket};
