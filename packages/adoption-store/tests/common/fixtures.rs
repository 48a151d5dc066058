//! Test fixtures: unsigned tokens and pet records.

#![allow(dead_code)]

use adoption_api::{AuthResponse, Pet, UserProfile};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

/// Fixed "now" so expiry checks are deterministic.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Build a JWT with an arbitrary payload and a junk signature.
pub fn token_with(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.unsigned")
}

/// Token for `user_id` valid for an hour after [`now`].
pub fn valid_token(user_id: i64, role: &str) -> String {
    token_with(json!({
        "userId": user_id,
        "email": format!("user{user_id}@example.org"),
        "role": role,
        "exp": (now() + Duration::hours(1)).timestamp(),
    }))
}

pub fn expired_token(user_id: i64) -> String {
    token_with(json!({
        "userId": user_id,
        "role": "user",
        "exp": (now() - Duration::minutes(5)).timestamp(),
    }))
}

pub fn auth_response(token: &str) -> AuthResponse {
    serde_json::from_value(json!({ "token": token })).unwrap()
}

pub fn profile(user_id: i64, full_name: &str, role: &str) -> UserProfile {
    UserProfile {
        user_id: Some(user_id),
        full_name: Some(full_name.to_string()),
        role: Some(role.to_string()),
        ..Default::default()
    }
}

fn pet_from(id: i64, name: &str, extra: Value) -> Pet {
    let mut value = json!({
        "petId": id,
        "petName": name,
        "slug": name.to_lowercase(),
        "categoryName": "Cat",
    });
    if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(value).unwrap()
}

pub fn verified_pet(id: i64, name: &str) -> Pet {
    pet_from(id, name, json!({ "isVerified": true }))
}

pub fn pending_pet(id: i64, name: &str) -> Pet {
    pet_from(
        id,
        name,
        json!({ "isVerified": false, "verificationStatus": "pending_verification" }),
    )
}

/// Two verified pets and one awaiting review.
pub fn three_pets() -> Vec<Pet> {
    vec![
        verified_pet(1, "Mochi"),
        pending_pet(2, "Bun"),
        verified_pet(3, "Tofu"),
    ]
}
