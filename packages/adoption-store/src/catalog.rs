//! Catalog slice: the pet collection and its verification queue.

use adoption_api::{Pet, VerificationStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub pets: Vec<Pet>,
    /// Pets still awaiting a staff decision, derived from `pets`.
    pub verification_queue: Vec<Pet>,
}

#[derive(Debug, Clone)]
pub enum CatalogAction {
    SetCollection(Vec<Pet>),
    SetVerificationQueue(Vec<Pet>),
    ApplyVerificationDecision { pet_id: i64, is_approved: bool },
}

/// Status as staff see it. An explicit status wins; otherwise only a
/// verified flag counts as decided.
///
/// The two fields are not OR-ed: `isVerified: false` next to an explicit
/// `verified` status is treated as decided and stays out of the queue.
pub fn effective_status(pet: &Pet) -> VerificationStatus {
    match pet.verification_status {
        Some(status) if status != VerificationStatus::Unknown => status,
        _ if pet.is_verified == Some(true) => VerificationStatus::Verified,
        _ => VerificationStatus::PendingVerification,
    }
}

pub fn needs_verification(pet: &Pet) -> bool {
    effective_status(pet) == VerificationStatus::PendingVerification
}

pub fn verification_queue(pets: &[Pet]) -> Vec<Pet> {
    pets.iter().filter(|p| needs_verification(p)).cloned().collect()
}

/// Pure catalog transition.
pub fn reduce(mut state: CatalogState, action: CatalogAction) -> CatalogState {
    match action {
        CatalogAction::SetCollection(pets) => state.pets = pets,
        CatalogAction::SetVerificationQueue(queue) => state.verification_queue = queue,
        CatalogAction::ApplyVerificationDecision {
            pet_id,
            is_approved,
        } => {
            if let Some(pet) = state.pets.iter_mut().find(|p| p.pet_id == pet_id) {
                pet.is_verified = Some(is_approved);
                pet.verification_status = Some(if is_approved {
                    VerificationStatus::Verified
                } else {
                    VerificationStatus::Rejected
                });
            }
            state.verification_queue.retain(|p| p.pet_id != pet_id);
        }
    }
    state
}
