//! Read-only projections of [`AppState`].

use adoption_api::Pet;

use crate::session::UserInfo;
use crate::store::AppState;

pub const ADMIN_ROLE: &str = "admin";

pub fn is_authenticated(state: &AppState) -> bool {
    state.session.is_authenticated()
}

pub fn user_info(state: &AppState) -> Option<&UserInfo> {
    state.session.user_info()
}

/// Route guard: signed in, and holding an allowed role or admin.
pub fn can_access(state: &AppState, allowed_roles: &[&str]) -> bool {
    let Some(user) = state.session.user_info() else {
        return false;
    };

    user.roles().iter().any(|role| {
        role.eq_ignore_ascii_case(ADMIN_ROLE)
            || allowed_roles.iter().any(|a| a.eq_ignore_ascii_case(role))
    })
}

pub fn all_pets(state: &AppState) -> &[Pet] {
    &state.catalog.pets
}

pub fn pets_needing_verification(state: &AppState) -> &[Pet] {
    &state.catalog.verification_queue
}

pub fn pet_by_id(state: &AppState, pet_id: i64) -> Option<&Pet> {
    state.catalog.pets.iter().find(|p| p.pet_id == pet_id)
}

pub fn pet_by_slug<'a>(state: &'a AppState, slug: &str) -> Option<&'a Pet> {
    state.catalog.pets.iter().find(|p| p.slug == slug)
}

/// Catalog filter. Empty fields and `"all"` match everything.
#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    /// Case-insensitive substring of the pet or owner name
    pub search: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub adoption_status: Option<String>,
}

impl PetFilter {
    pub fn matches(&self, pet: &Pet) -> bool {
        let search_ok = match active(&self.search) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                pet.pet_name.to_lowercase().contains(&term)
                    || pet
                        .owner_name
                        .as_deref()
                        .is_some_and(|owner| owner.to_lowercase().contains(&term))
            }
        };

        search_ok
            && field_matches(&self.category, pet.category_name.as_deref())
            && field_matches(&self.gender, pet.gender.as_deref())
            && field_matches(&self.adoption_status, pet.adoption_status.as_deref())
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn field_matches(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match active(wanted) {
        None => true,
        Some(wanted) => actual.is_some_and(|a| a.eq_ignore_ascii_case(wanted)),
    }
}

pub fn filter_pets<'a>(state: &'a AppState, filter: &PetFilter) -> Vec<&'a Pet> {
    state
        .catalog
        .pets
        .iter()
        .filter(|p| filter.matches(p))
        .collect()
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into range
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Never less than 1
    pub total_pages: usize,
}

pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        page_size,
        total_items: items.len(),
        total_pages,
    }
}
