// models/src/identity.rs

use core::fmt;

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three principal kinds known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Doctor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Doctor => write!(f, "doctor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Registration input carrying the plaintext password. Held in memory only;
/// the stored record keeps the bcrypt hash.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIdentity {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A registered principal as stored. `is_approved` is meaningful only for
/// doctors; customers and admins are created approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Hashes a plaintext password.
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    /// Verifies a plaintext password against this identity's stored hash.
    pub fn verify_password(&self, password: &str) -> Result<bool, BcryptError> {
        verify(password, &self.password_hash)
    }

    /// Builds a stored identity from registration input, hashing the
    /// password and folding the username to lowercase.
    pub fn from_new(new: NewIdentity, role: Role, is_approved: bool) -> Result<Self, BcryptError> {
        let now = Utc::now();
        let password_hash = Self::hash_password(&new.password)?;

        Ok(Identity {
            id: Uuid::new_v4(),
            name: new.name,
            username: new.username.trim().to_lowercase(),
            email: new.email,
            password_hash,
            role,
            is_approved,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Derives role and initial approval from the registration email. An email
/// under the sentinel doctor domain registers as an unapproved doctor;
/// anything else is an approved customer. Admin accounts are never created
/// through registration.
pub fn classify_registration(email: &str, doctor_domain: &str) -> (Role, bool) {
    if email.ends_with(doctor_domain) {
        (Role::Doctor, false)
    } else {
        (Role::Customer, true)
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_registration, Identity, NewIdentity, Role};

    const DOCTOR_DOMAIN: &str = "@doctor.com";

    fn new_identity(email: &str) -> NewIdentity {
        NewIdentity {
            name: "Alice Smith".to_string(),
            username: "AliceSmith".to_string(),
            email: email.to_string(),
            password: "supersecret".to_string(),
        }
    }

    #[test]
    fn should_classify_doctor_domain_as_unapproved_doctor() {
        let (role, approved) = classify_registration("gregory@doctor.com", DOCTOR_DOMAIN);
        assert_eq!(role, Role::Doctor);
        assert!(!approved);
    }

    #[test]
    fn should_classify_other_domains_as_approved_customer() {
        let (role, approved) = classify_registration("alice@example.com", DOCTOR_DOMAIN);
        assert_eq!(role, Role::Customer);
        assert!(approved);
    }

    #[test]
    fn should_lowercase_username_and_hash_password() {
        let identity =
            Identity::from_new(new_identity("alice@example.com"), Role::Customer, true).unwrap();
        assert_eq!(identity.username, "alicesmith");
        assert_ne!(identity.password_hash, "supersecret");
        assert!(identity.verify_password("supersecret").unwrap());
        assert!(!identity.verify_password("wrong").unwrap());
    }

    #[test]
    fn should_serialize_role_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"doctor\"");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
