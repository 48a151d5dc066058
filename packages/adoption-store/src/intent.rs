//! Intents: named requests for work consumed by the effect runner.

use std::fmt;

use adoption_api::SignInRequest;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    SignIn,
    /// Startup re-adoption of a persisted token. Has no [`Intent`] of its
    /// own; it only keys the session commit made by `bootstrap`.
    RestoreSession,
    Logout,
    FetchUserLogin,
    GetAllPets,
    GetPetsNeedingVerification,
    VerifyPet,
}

impl IntentKind {
    /// Whether a newer dispatch may abort an in-flight task of this kind.
    ///
    /// Kinds that persist credentials or commit after a remote mutation
    /// are left to finish and are discarded by their ticket instead.
    pub fn is_abortable(self) -> bool {
        matches!(
            self,
            IntentKind::FetchUserLogin
                | IntentKind::GetAllPets
                | IntentKind::GetPetsNeedingVerification
        )
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntentKind::SignIn => "SIGN_IN",
            IntentKind::RestoreSession => "RESTORE_SESSION",
            IntentKind::Logout => "LOGOUT",
            IntentKind::FetchUserLogin => "FETCH_USER_LOGIN",
            IntentKind::GetAllPets => "GET_ALL_PETS",
            IntentKind::GetPetsNeedingVerification => "GET_PETS_NEEDING_VERIFICATION",
            IntentKind::VerifyPet => "VERIFY_PET",
        };
        f.write_str(name)
    }
}

/// What "same kind" means for take-latest.
///
/// Verification decisions on different pets are independent, so they are
/// keyed by pet as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntentKey {
    pub kind: IntentKind,
    pub scope: Option<i64>,
}

impl From<IntentKind> for IntentKey {
    fn from(kind: IntentKind) -> Self {
        Self { kind, scope: None }
    }
}

#[derive(Debug, Clone)]
pub enum Intent {
    SignIn(SignInRequest),
    Logout,
    FetchUserLogin { token: String },
    GetAllPets,
    GetPetsNeedingVerification,
    VerifyPet { pet_id: i64, is_approved: bool },
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::SignIn(_) => IntentKind::SignIn,
            Intent::Logout => IntentKind::Logout,
            Intent::FetchUserLogin { .. } => IntentKind::FetchUserLogin,
            Intent::GetAllPets => IntentKind::GetAllPets,
            Intent::GetPetsNeedingVerification => IntentKind::GetPetsNeedingVerification,
            Intent::VerifyPet { .. } => IntentKind::VerifyPet,
        }
    }

    pub fn key(&self) -> IntentKey {
        match self {
            Intent::VerifyPet { pet_id, .. } => IntentKey {
                kind: IntentKind::VerifyPet,
                scope: Some(*pet_id),
            },
            other => other.kind().into(),
        }
    }
}

/// Correlation id attached to the tracing span of one effect run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntentId(pub Uuid);

impl IntentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IntentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an effect ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    /// The result was committed to the store.
    Applied,
    /// A newer intent of the same kind, or a logout, made the result stale.
    Superseded,
    /// Nothing to do.
    Skipped,
    /// The effect failed; the store is unchanged.
    Failed(String),
}

impl EffectOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EffectOutcome::Applied)
    }
}
