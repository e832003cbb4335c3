//! Registration draft and its field rules.

use serde::Serialize;
use thiserror::Error;

use crate::store::{RegistrationRequest, StudentProfile};

/// Most guests a student may bring.
pub const MAX_GUESTS: i64 = 2;

pub const GUEST_RANGE_MESSAGE: &str = "Number of guests must be between 0 and 2.";
pub const GUARDIAN_REQUIRED_MESSAGE: &str = "Guardian name is required";

/// Editable field of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    GuestCount,
    Guardian1,
    Guardian2,
}

/// One of the two guardian name slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardianSlot {
    First,
    Second,
}

impl GuardianSlot {
    /// 1-based slot number; the slot is open when the guest count reaches it.
    pub fn number(self) -> i64 {
        match self {
            GuardianSlot::First => 1,
            GuardianSlot::Second => 2,
        }
    }

    pub fn field(self) -> DraftField {
        match self {
            GuardianSlot::First => DraftField::Guardian1,
            GuardianSlot::Second => DraftField::Guardian2,
        }
    }
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: DraftField,
    pub message: String,
}

impl FieldError {
    pub fn out_of_range() -> Self {
        Self {
            field: DraftField::GuestCount,
            message: GUEST_RANGE_MESSAGE.to_string(),
        }
    }

    pub fn required(field: DraftField) -> Self {
        Self {
            field,
            message: GUARDIAN_REQUIRED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Registration details can no longer be edited")]
    Immutable,

    #[error("Guardian slot {0} is not open for the current guest count")]
    SlotNotOpen(i64),
}

/// Apply every registration rule and collect all violations.
///
/// Rules are independent: an out-of-range count does not hide a missing
/// guardian name and vice versa. The guardian rules see the count clamped to
/// `0..=MAX_GUESTS`, so a count above the limit requires both names.
pub fn check_registration(
    guest_count: Option<i64>,
    guardian1: &str,
    guardian2: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let count = match guest_count {
        Some(count) if (0..=MAX_GUESTS).contains(&count) => count,
        Some(count) => {
            errors.push(FieldError::out_of_range());
            count.clamp(0, MAX_GUESTS)
        }
        None => {
            errors.push(FieldError::out_of_range());
            return errors;
        }
    };

    if count >= 1 && guardian1.trim().is_empty() {
        errors.push(FieldError::required(DraftField::Guardian1));
    }
    if count >= 2 && guardian2.trim().is_empty() {
        errors.push(FieldError::required(DraftField::Guardian2));
    }

    errors
}

/// Client-side registration input, alive only while the form is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationDraft {
    guest_count: Option<i64>,
    guardian1: String,
    guardian2: String,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft mirroring an existing registration exactly as the store holds it.
    pub fn from_profile(profile: &StudentProfile) -> Self {
        Self {
            guest_count: Some(profile.guest_count.unwrap_or(0)),
            guardian1: profile.guardian1.clone().unwrap_or_default(),
            guardian2: profile.guardian2.clone().unwrap_or_default(),
        }
    }

    pub fn guest_count(&self) -> Option<i64> {
        self.guest_count
    }

    pub fn guardian(&self, slot: GuardianSlot) -> &str {
        match slot {
            GuardianSlot::First => &self.guardian1,
            GuardianSlot::Second => &self.guardian2,
        }
    }

    pub fn is_slot_open(&self, slot: GuardianSlot) -> bool {
        self.guest_count.unwrap_or(0) >= slot.number()
    }

    /// Change the guest count, clearing every guardian slot it closes.
    ///
    /// Returns the closed slots, which are now empty.
    pub fn set_guest_count(&mut self, count: Option<i64>) -> Vec<GuardianSlot> {
        self.guest_count = count;

        let mut cleared = Vec::new();
        for slot in [GuardianSlot::First, GuardianSlot::Second] {
            if !self.is_slot_open(slot) {
                self.slot_mut(slot).clear();
                cleared.push(slot);
            }
        }
        cleared
    }

    pub fn set_guardian(
        &mut self,
        slot: GuardianSlot,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        if !self.is_slot_open(slot) {
            return Err(DraftError::SlotNotOpen(slot.number()));
        }
        *self.slot_mut(slot) = value.into();
        Ok(())
    }

    /// Check the draft and build the submission body.
    pub fn validate(&self) -> Result<RegistrationRequest, Vec<FieldError>> {
        let errors = check_registration(self.guest_count, &self.guardian1, &self.guardian2);
        if !errors.is_empty() {
            return Err(errors);
        }

        // Checked above
        let guest_count = self.guest_count.unwrap_or(0);
        Ok(RegistrationRequest {
            guest_count,
            guest_1_name: self.submitted_name(GuardianSlot::First),
            guest_2_name: self.submitted_name(GuardianSlot::Second),
        })
    }

    fn submitted_name(&self, slot: GuardianSlot) -> Option<String> {
        if !self.is_slot_open(slot) {
            return None;
        }
        let name = self.guardian(slot).trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    fn slot_mut(&mut self, slot: GuardianSlot) -> &mut String {
        match slot {
            GuardianSlot::First => &mut self.guardian1,
            GuardianSlot::Second => &mut self.guardian2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<DraftField> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_unset_count_blocks() {
        let draft = RegistrationDraft::new();
        let errors = draft.validate().unwrap_err();
        assert_eq!(fields(&errors), vec![DraftField::GuestCount]);
        assert_eq!(errors[0].message, GUEST_RANGE_MESSAGE);
    }

    #[test]
    fn test_out_of_range_counts_block() {
        for count in [-3, -1, 3, 10] {
            let mut draft = RegistrationDraft::new();
            draft.set_guest_count(Some(count));
            let errors = draft.validate().unwrap_err();
            assert!(
                fields(&errors).contains(&DraftField::GuestCount),
                "count {} should be rejected",
                count
            );
        }
    }

    #[test]
    fn test_all_violations_reported_together() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(3));
        let errors = draft.validate().unwrap_err();
        assert_eq!(
            fields(&errors),
            vec![
                DraftField::GuestCount,
                DraftField::Guardian1,
                DraftField::Guardian2
            ]
        );
    }

    #[test]
    fn test_negative_count_needs_no_guardian() {
        let errors = check_registration(Some(-1), "", "");
        assert_eq!(fields(&errors), vec![DraftField::GuestCount]);
    }

    #[test]
    fn test_zero_guests_needs_no_guardian() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(0));
        let request = draft.validate().unwrap();
        assert_eq!(request.guest_count, 0);
        assert!(request.guest_1_name.is_none());
        assert!(request.guest_2_name.is_none());
    }

    #[test]
    fn test_one_guest_blank_guardian() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(1));
        draft.set_guardian(GuardianSlot::First, "   ").unwrap();
        let errors = draft.validate().unwrap_err();
        assert_eq!(fields(&errors), vec![DraftField::Guardian1]);
        assert_eq!(errors[0].message, GUARDIAN_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_one_guest_never_requires_second() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(1));
        draft.set_guardian(GuardianSlot::First, "Ravi").unwrap();
        let request = draft.validate().unwrap();
        assert_eq!(request.guest_1_name.as_deref(), Some("Ravi"));
        assert!(request.guest_2_name.is_none());
    }

    #[test]
    fn test_two_guests_body() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(2));
        draft.set_guardian(GuardianSlot::First, "A").unwrap();
        draft.set_guardian(GuardianSlot::Second, "B").unwrap();
        assert_eq!(
            draft.validate().unwrap(),
            RegistrationRequest {
                guest_count: 2,
                guest_1_name: Some("A".to_string()),
                guest_2_name: Some("B".to_string()),
            }
        );
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(1));
        draft.set_guardian(GuardianSlot::First, "  Ravi Menon ").unwrap();
        let request = draft.validate().unwrap();
        assert_eq!(request.guest_1_name.as_deref(), Some("Ravi Menon"));
    }

    #[test]
    fn test_decreasing_to_one_clears_second() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(2));
        draft.set_guardian(GuardianSlot::First, "A").unwrap();
        draft.set_guardian(GuardianSlot::Second, "B").unwrap();

        let cleared = draft.set_guest_count(Some(1));
        assert_eq!(cleared, vec![GuardianSlot::Second]);
        assert_eq!(draft.guardian(GuardianSlot::First), "A");
        assert_eq!(draft.guardian(GuardianSlot::Second), "");

        // Raising the count again does not bring the old value back
        draft.set_guest_count(Some(2));
        assert_eq!(draft.guardian(GuardianSlot::Second), "");
    }

    #[test]
    fn test_decreasing_to_zero_or_unset_clears_both() {
        for count in [Some(0), None, Some(-1)] {
            let mut draft = RegistrationDraft::new();
            draft.set_guest_count(Some(2));
            draft.set_guardian(GuardianSlot::First, "A").unwrap();
            draft.set_guardian(GuardianSlot::Second, "B").unwrap();

            draft.set_guest_count(count);
            assert_eq!(draft.guardian(GuardianSlot::First), "");
            assert_eq!(draft.guardian(GuardianSlot::Second), "");
        }
    }

    #[test]
    fn test_closed_slot_rejects_edit() {
        let mut draft = RegistrationDraft::new();
        draft.set_guest_count(Some(1));
        assert_eq!(
            draft.set_guardian(GuardianSlot::Second, "B"),
            Err(DraftError::SlotNotOpen(2))
        );
    }

    #[test]
    fn test_from_profile_defaults() {
        let profile = StudentProfile {
            is_registered: true,
            ..Default::default()
        };
        let draft = RegistrationDraft::from_profile(&profile);
        assert_eq!(draft.guest_count(), Some(0));
        assert_eq!(draft.guardian(GuardianSlot::First), "");
    }
}
