// storage/src/sled_store.rs

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Transactional, Tree};
use tracing::debug;
use uuid::Uuid;

use models::{
    Appointment, AppointmentStatus, DoctorProfile, DomainError, DomainResult, Identity,
    ProfileUpdate, Role,
};

use crate::{AppointmentScope, ClinicStore};

const IDENTITIES_TREE: &str = "identities";
const IDENTITY_INDEX_TREE: &str = "identity_index";
const PROFILES_TREE: &str = "doctor_profiles";
const APPOINTMENTS_TREE: &str = "appointments";

/// Sled-backed implementation of [`ClinicStore`]. One keyspace on disk: a
/// tree per collection plus a single index tree whose prefixed keys
/// (`email:…`, `username:…`) enforce the identity uniqueness invariants.
/// Records are serde_json encoded.
pub struct SledStore {
    db: sled::Db,
    identities: Tree,
    identity_index: Tree,
    profiles: Tree,
    appointments: Tree,
}

/// Index key for an email reservation.
fn email_key(email: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(6 + email.len());
    key.extend_from_slice(b"email:");
    key.extend_from_slice(email.as_bytes());
    key
}

/// Index key for a username reservation. Callers store usernames already
/// folded to lowercase.
fn username_key(username: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(9 + username.len());
    key.extend_from_slice(b"username:");
    key.extend_from_slice(username.as_bytes());
    key
}

fn storage_err(err: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("Storage error: {}", err))
}

fn encode<T: Serialize>(value: &T) -> DomainResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(DomainError::from)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DomainResult<T> {
    serde_json::from_slice(bytes).map_err(DomainError::from)
}

/// Collapses a sled transaction result: aborts carry a `DomainError`,
/// storage failures are wrapped as internal.
fn unwrap_tx<T>(result: Result<T, TransactionError<DomainError>>) -> DomainResult<T> {
    result.map_err(|err| match err {
        TransactionError::Abort(domain) => domain,
        TransactionError::Storage(e) => storage_err(e),
    })
}

impl SledStore {
    /// Opens (or creates) the keyspace at `path` and its trees.
    pub fn open(path: impl AsRef<Path>) -> DomainResult<Self> {
        let db = sled::open(path.as_ref()).map_err(storage_err)?;
        let identities = db.open_tree(IDENTITIES_TREE).map_err(storage_err)?;
        let identity_index = db.open_tree(IDENTITY_INDEX_TREE).map_err(storage_err)?;
        let profiles = db.open_tree(PROFILES_TREE).map_err(storage_err)?;
        let appointments = db.open_tree(APPOINTMENTS_TREE).map_err(storage_err)?;
        debug!(path = %path.as_ref().display(), "opened sled keyspace");

        Ok(Self {
            db,
            identities,
            identity_index,
            profiles,
            appointments,
        })
    }

    async fn flush(&self) -> DomainResult<()> {
        self.db.flush_async().await.map(|_| ()).map_err(storage_err)
    }

    fn identity_at(&self, id_bytes: &[u8]) -> DomainResult<Option<Identity>> {
        match self.identities.get(id_bytes).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ClinicStore for SledStore {
    async fn insert_identity(&self, identity: &Identity) -> DomainResult<()> {
        let record = encode(identity)?;
        let result = (&self.identities, &self.identity_index).transaction(|(identities, index)| {
            if index.get(email_key(&identity.email))?.is_some() {
                return Err(ConflictableTransactionError::Abort(DomainError::duplicate(
                    "User with this email already exists.",
                )));
            }
            if index.get(username_key(&identity.username))?.is_some() {
                return Err(ConflictableTransactionError::Abort(DomainError::duplicate(
                    "User with this username already exists.",
                )));
            }
            index.insert(email_key(&identity.email), &identity.id.as_bytes()[..])?;
            index.insert(username_key(&identity.username), &identity.id.as_bytes()[..])?;
            identities.insert(&identity.id.as_bytes()[..], record.clone())?;
            Ok(())
        });
        unwrap_tx(result)?;
        self.flush().await
    }

    async fn update_identity(&self, identity: &Identity) -> DomainResult<()> {
        let record = encode(identity)?;
        self.identities
            .insert(&identity.id.as_bytes()[..], record)
            .map_err(storage_err)?;
        self.flush().await
    }

    async fn identity_by_id(&self, id: Uuid) -> DomainResult<Option<Identity>> {
        self.identity_at(&id.as_bytes()[..])
    }

    async fn identity_by_username(&self, username: &str) -> DomainResult<Option<Identity>> {
        match self
            .identity_index
            .get(username_key(username))
            .map_err(storage_err)?
        {
            Some(id_bytes) => self.identity_at(&id_bytes),
            None => Ok(None),
        }
    }

    async fn identity_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
        match self
            .identity_index
            .get(email_key(email))
            .map_err(storage_err)?
        {
            Some(id_bytes) => self.identity_at(&id_bytes),
            None => Ok(None),
        }
    }

    async fn doctors_by_approval(&self, approved: bool) -> DomainResult<Vec<Identity>> {
        let mut doctors = Vec::new();
        for item in self.identities.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let identity: Identity = decode(&bytes)?;
            if identity.role == Role::Doctor && identity.is_approved == approved {
                doctors.push(identity);
            }
        }
        doctors.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(doctors)
    }

    async fn put_profile(&self, profile: &DoctorProfile) -> DomainResult<()> {
        let record = encode(profile)?;
        self.profiles
            .insert(&profile.user_id.as_bytes()[..], record)
            .map_err(storage_err)?;
        self.flush().await
    }

    async fn profile_for(&self, doctor_id: Uuid) -> DomainResult<Option<DoctorProfile>> {
        match self
            .profiles
            .get(&doctor_id.as_bytes()[..])
            .map_err(storage_err)?
        {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn apply_profile_update(
        &self,
        doctor_id: Uuid,
        update: &ProfileUpdate,
    ) -> DomainResult<Option<DoctorProfile>> {
        let result = self.profiles.transaction(|tx| {
            let Some(bytes) = tx.get(&doctor_id.as_bytes()[..])? else {
                return Ok(None);
            };
            let mut profile: DoctorProfile =
                decode(&bytes).map_err(ConflictableTransactionError::Abort)?;
            profile.apply(update);
            profile.updated_at = Utc::now();
            let record = encode(&profile).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(&doctor_id.as_bytes()[..], record)?;
            Ok(Some(profile))
        });
        let updated = unwrap_tx(result)?;
        if updated.is_some() {
            self.flush().await?;
        }
        Ok(updated)
    }

    async fn increment_profile_appointments(&self, doctor_id: Uuid) -> DomainResult<()> {
        let result = self.profiles.transaction(|tx| {
            let Some(bytes) = tx.get(&doctor_id.as_bytes()[..])? else {
                return Err(ConflictableTransactionError::Abort(DomainError::not_found(
                    "Doctor profile data missing, cannot book appointment.",
                )));
            };
            let mut profile: DoctorProfile =
                decode(&bytes).map_err(ConflictableTransactionError::Abort)?;
            profile.total_appointments += 1;
            profile.updated_at = Utc::now();
            let record = encode(&profile).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(&doctor_id.as_bytes()[..], record)?;
            Ok(())
        });
        unwrap_tx(result)?;
        self.flush().await
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> DomainResult<()> {
        let record = encode(appointment)?;
        self.appointments
            .insert(&appointment.id.as_bytes()[..], record)
            .map_err(storage_err)?;
        self.flush().await
    }

    async fn appointment_by_id(&self, id: Uuid) -> DomainResult<Option<Appointment>> {
        match self
            .appointments
            .get(&id.as_bytes()[..])
            .map_err(storage_err)?
        {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn appointments_in(&self, scope: AppointmentScope) -> DomainResult<Vec<Appointment>> {
        let mut appointments = Vec::new();
        for item in self.appointments.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let appointment: Appointment = decode(&bytes)?;
            let keep = match scope {
                AppointmentScope::All => true,
                AppointmentScope::ForCustomer(id) => appointment.customer_id == id,
                AppointmentScope::ForDoctor(id) => appointment.doctor_id == id,
            };
            if keep {
                appointments.push(appointment);
            }
        }
        appointments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(appointments)
    }

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        is_emergency: Option<bool>,
    ) -> DomainResult<Option<Appointment>> {
        let result = self.appointments.transaction(|tx| {
            let Some(bytes) = tx.get(&id.as_bytes()[..])? else {
                return Ok(None);
            };
            let mut appointment: Appointment =
                decode(&bytes).map_err(ConflictableTransactionError::Abort)?;
            appointment.status = status;
            if let Some(flag) = is_emergency {
                appointment.is_emergency = flag;
            }
            appointment.updated_at = Utc::now();
            let record = encode(&appointment).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(&id.as_bytes()[..], record)?;
            Ok(Some(appointment))
        });
        let updated = unwrap_tx(result)?;
        if updated.is_some() {
            self.flush().await?;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::SledStore;
    use crate::{AppointmentScope, ClinicStore};
    use chrono::Utc;
    use models::{
        Appointment, AppointmentStatus, DoctorProfile, DomainError, Identity, ProfileUpdate, Role,
    };
    use tempfile::TempDir;
    use uuid::Uuid;

    fn open_store() -> (TempDir, SledStore) {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn identity(username: &str, email: &str, role: Role) -> Identity {
        let now = Utc::now();
        Identity {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$notarealhash".to_string(),
            role,
            is_approved: role != Role::Doctor,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn should_round_trip_identity_lookups() {
        let (_dir, store) = open_store();
        let alice = identity("alice", "alice@example.com", Role::Customer);
        store.insert_identity(&alice).await.unwrap();

        assert_eq!(
            store.identity_by_id(alice.id).await.unwrap(),
            Some(alice.clone())
        );
        assert_eq!(
            store.identity_by_email("alice@example.com").await.unwrap(),
            Some(alice.clone())
        );
        assert_eq!(
            store.identity_by_username("alice").await.unwrap(),
            Some(alice)
        );
        assert_eq!(
            store.identity_by_email("bob@example.com").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn should_reject_duplicate_email_and_username() {
        let (_dir, store) = open_store();
        store
            .insert_identity(&identity("alice", "alice@example.com", Role::Customer))
            .await
            .unwrap();

        let same_email = identity("alice2", "alice@example.com", Role::Customer);
        let err = store.insert_identity(&same_email).await.unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(_)));

        let same_username = identity("alice", "other@example.com", Role::Customer);
        let err = store.insert_identity(&same_username).await.unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(_)));

        // The failed inserts must not have reserved anything.
        assert_eq!(
            store.identity_by_email("other@example.com").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn should_filter_doctors_by_approval() {
        let (_dir, store) = open_store();
        let mut approved = identity("drgregory", "gregory@doctor.com", Role::Doctor);
        approved.is_approved = true;
        let pending = identity("drlisa", "lisa@doctor.com", Role::Doctor);
        let customer = identity("alice", "alice@example.com", Role::Customer);
        store.insert_identity(&approved).await.unwrap();
        store.insert_identity(&pending).await.unwrap();
        store.insert_identity(&customer).await.unwrap();

        let listed = store.doctors_by_approval(true).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "drgregory");

        let waiting = store.doctors_by_approval(false).await.unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].username, "drlisa");
    }

    #[tokio::test]
    async fn should_merge_profile_update_and_keep_other_fields() {
        let (_dir, store) = open_store();
        let doctor_id = Uuid::new_v4();
        store
            .put_profile(&DoctorProfile::placeholder(doctor_id))
            .await
            .unwrap();

        let update = ProfileUpdate {
            bio: Some("Seen it all.".to_string()),
            ..ProfileUpdate::default()
        };
        let updated = store
            .apply_profile_update(doctor_id, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.bio, "Seen it all.");
        assert_eq!(updated.specialization, "General Practice");

        let missing = store
            .apply_profile_update(Uuid::new_v4(), &update)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn should_increment_appointment_counter() {
        let (_dir, store) = open_store();
        let doctor_id = Uuid::new_v4();
        store
            .put_profile(&DoctorProfile::placeholder(doctor_id))
            .await
            .unwrap();

        store
            .increment_profile_appointments(doctor_id)
            .await
            .unwrap();
        store
            .increment_profile_appointments(doctor_id)
            .await
            .unwrap();

        let profile = store.profile_for(doctor_id).await.unwrap().unwrap();
        assert_eq!(profile.total_appointments, 2);

        let err = store
            .increment_profile_appointments(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn should_write_status_and_emergency_together() {
        let (_dir, store) = open_store();
        let appointment = Appointment::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now(), vec![]);
        store.insert_appointment(&appointment).await.unwrap();

        let updated = store
            .set_appointment_status(appointment.id, AppointmentStatus::Scheduled, Some(true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Scheduled);
        assert!(updated.is_emergency);

        // Absent flag leaves the stored value alone.
        let updated = store
            .set_appointment_status(appointment.id, AppointmentStatus::Completed, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert!(updated.is_emergency);

        let gone = store
            .set_appointment_status(Uuid::new_v4(), AppointmentStatus::Canceled, None)
            .await
            .unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn should_scope_appointment_listings() {
        let (_dir, store) = open_store();
        let customer = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let mine = Appointment::new(customer, doctor, Utc::now(), vec![]);
        let other = Appointment::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now(), vec![]);
        store.insert_appointment(&mine).await.unwrap();
        store.insert_appointment(&other).await.unwrap();

        let all = store.appointments_in(AppointmentScope::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let for_customer = store
            .appointments_in(AppointmentScope::ForCustomer(customer))
            .await
            .unwrap();
        assert_eq!(for_customer.len(), 1);
        assert_eq!(for_customer[0].id, mine.id);

        let for_doctor = store
            .appointments_in(AppointmentScope::ForDoctor(doctor))
            .await
            .unwrap();
        assert_eq!(for_doctor.len(), 1);
    }

    #[tokio::test]
    async fn should_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let alice = identity("alice", "alice@example.com", Role::Customer);
        {
            let store = SledStore::open(dir.path()).unwrap();
            store.insert_identity(&alice).await.unwrap();
        }

        let reopened = SledStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.identity_by_id(alice.id).await.unwrap(),
            Some(alice)
        );
    }
}
