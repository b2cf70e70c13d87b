// models/src/doctor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One weekday's bookable slots, e.g. day "Monday", slots ["09:00", "10:00"].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: String,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

/// Doctor-specific extension record. At most one per doctor identity, keyed
/// by the owning identity id. `total_appointments` only moves through the
/// booking path and is informational; it never gates eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub user_id: Uuid,
    pub specialization: String,
    pub experience: u32,
    pub location: String,
    pub clinic: String,
    pub phone_number: String,
    pub bio: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub ratings: Vec<u8>,
    pub total_appointments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorProfile {
    /// The record seeded when a doctor registers, before they have filled
    /// anything in.
    pub fn placeholder(user_id: Uuid) -> Self {
        let now = Utc::now();
        DoctorProfile {
            user_id,
            specialization: "General Practice".to_string(),
            experience: 1,
            location: "Not Specified".to_string(),
            clinic: "Not Specified".to_string(),
            phone_number: "Not Specified".to_string(),
            bio: "Doctor profile pending update.".to_string(),
            schedule: Vec::new(),
            ratings: Vec::new(),
            total_appointments: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Only fields present in the request are
    /// written; an absent field keeps its current value, it is never
    /// cleared.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(ref specialization) = update.specialization {
            self.specialization = specialization.clone();
        }
        if let Some(experience) = update.experience {
            self.experience = experience;
        }
        if let Some(ref location) = update.location {
            self.location = location.clone();
        }
        if let Some(ref clinic) = update.clinic {
            self.clinic = clinic.clone();
        }
        if let Some(ref phone_number) = update.phone_number {
            self.phone_number = phone_number.clone();
        }
        if let Some(ref bio) = update.bio {
            self.bio = bio.clone();
        }
        if let Some(ref schedule) = update.schedule {
            self.schedule = schedule.clone();
        }
    }
}

/// Partial-update request for a doctor's own profile. `None` means "leave
/// unchanged". Ratings and the appointment counter are not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub location: Option<String>,
    pub clinic: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub schedule: Option<Vec<ScheduleEntry>>,
}

#[cfg(test)]
mod tests {
    use super::{DoctorProfile, ProfileUpdate, ScheduleEntry};
    use uuid::Uuid;

    #[test]
    fn should_seed_placeholder_values() {
        let profile = DoctorProfile::placeholder(Uuid::new_v4());
        assert_eq!(profile.specialization, "General Practice");
        assert_eq!(profile.experience, 1);
        assert_eq!(profile.location, "Not Specified");
        assert_eq!(profile.clinic, "Not Specified");
        assert_eq!(profile.phone_number, "Not Specified");
        assert_eq!(profile.bio, "Doctor profile pending update.");
        assert!(profile.schedule.is_empty());
        assert!(profile.ratings.is_empty());
        assert_eq!(profile.total_appointments, 0);
    }

    #[test]
    fn should_leave_absent_fields_untouched() {
        let mut profile = DoctorProfile::placeholder(Uuid::new_v4());
        profile.specialization = "Cardiology".to_string();
        profile.experience = 12;

        let update = ProfileUpdate {
            bio: Some("new text".to_string()),
            ..ProfileUpdate::default()
        };
        profile.apply(&update);

        assert_eq!(profile.bio, "new text");
        assert_eq!(profile.specialization, "Cardiology");
        assert_eq!(profile.experience, 12);
        assert_eq!(profile.clinic, "Not Specified");
    }

    #[test]
    fn should_replace_schedule_wholesale_when_present() {
        let mut profile = DoctorProfile::placeholder(Uuid::new_v4());
        let update = ProfileUpdate {
            schedule: Some(vec![ScheduleEntry {
                day: "Monday".to_string(),
                time_slots: vec!["09:00".to_string(), "10:00".to_string()],
            }]),
            ..ProfileUpdate::default()
        };
        profile.apply(&update);

        assert_eq!(profile.schedule.len(), 1);
        assert_eq!(profile.schedule[0].day, "Monday");
        assert_eq!(profile.schedule[0].time_slots.len(), 2);
    }

    #[test]
    fn should_parse_partial_update_with_missing_fields() {
        let update: ProfileUpdate = serde_json::from_str(r#"{"bio":"hi"}"#).unwrap();
        assert_eq!(update.bio.as_deref(), Some("hi"));
        assert!(update.specialization.is_none());
        assert!(update.schedule.is_none());
    }
}
