//! Session slice: who is signed in.

use adoption_api::UserProfile;

use crate::claims::Claims;

/// Identity of the signed-in user.
///
/// Starts from the token claims; the server profile is layered on top once
/// it has been fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub claims: Claims,
    pub profile: Option<UserProfile>,
}

impl UserInfo {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            claims,
            profile: None,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.profile
            .as_ref()
            .and_then(|p| p.user_id)
            .map(|id| id.to_string())
            .or_else(|| self.claims.user_id.clone())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.full_name.as_deref().or(p.username.as_deref()))
            .or(self.claims.name.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.email.as_deref())
            .or(self.claims.email.as_deref())
    }

    /// Roles from the profile when it names any, otherwise from the token.
    pub fn roles(&self) -> Vec<&str> {
        if let Some(profile) = &self.profile {
            let mut roles: Vec<&str> = profile.roles.iter().map(String::as_str).collect();
            if let Some(role) = profile.role.as_deref() {
                roles.push(role);
            }
            if !roles.is_empty() {
                return roles;
            }
        }
        self.claims.roles.iter().map(String::as_str).collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { user: UserInfo },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn user_info(&self) -> Option<&UserInfo> {
        match self {
            SessionState::Authenticated { user } => Some(user),
            SessionState::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    SignedIn(Claims),
    ProfileLoaded(UserProfile),
    LoggedOut,
}

/// Pure session transition.
pub fn reduce(state: SessionState, action: SessionAction) -> SessionState {
    match (state, action) {
        (_, SessionAction::SignedIn(claims)) => SessionState::Authenticated {
            user: UserInfo::from_claims(claims),
        },
        (SessionState::Authenticated { mut user }, SessionAction::ProfileLoaded(profile)) => {
            user.profile = Some(profile);
            SessionState::Authenticated { user }
        }
        // A late profile never resurrects a closed session.
        (SessionState::Anonymous, SessionAction::ProfileLoaded(_)) => SessionState::Anonymous,
        (_, SessionAction::LoggedOut) => SessionState::Anonymous,
    }
}
