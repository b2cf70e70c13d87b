// services/src/identity.rs

use std::sync::Arc;

use tracing::{error, info};

use models::{
    classify_registration, DoctorProfile, DomainError, DomainResult, Identity, NewIdentity, Role,
};
use security::{Claims, TokenKeys};
use storage::ClinicStore;

/// Whether the doctor-profile side record could be provisioned during
/// registration. `Failed` keeps the registration successful but preserves
/// the signal for operators instead of discarding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileProvisioning {
    NotRequired,
    Created,
    Failed,
}

/// Everything a successful registration produces.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub identity: Identity,
    pub token: String,
    pub message: String,
    pub profile: ProfileProvisioning,
}

/// Registration, credential verification and token resolution over the
/// identity collection.
pub struct IdentityService {
    store: Arc<dyn ClinicStore>,
    keys: TokenKeys,
    doctor_domain: String,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        keys: TokenKeys,
        doctor_domain: impl Into<String>,
    ) -> Self {
        Self {
            store,
            keys,
            doctor_domain: doctor_domain.into(),
        }
    }

    /// Registers a new principal. Email and username collisions are checked
    /// independently, email first; the store's uniqueness reservation
    /// backstops two concurrent registrations racing past these reads.
    pub async fn register(&self, new: NewIdentity) -> DomainResult<RegistrationOutcome> {
        if new.name.trim().is_empty()
            || new.username.trim().is_empty()
            || new.email.trim().is_empty()
            || new.password.is_empty()
        {
            return Err(DomainError::validation(
                "Please enter all fields: name, username, email, and password.",
            ));
        }

        if self.store.identity_by_email(&new.email).await?.is_some() {
            return Err(DomainError::duplicate(
                "User with this email already exists.",
            ));
        }
        if self
            .store
            .identity_by_username(&new.username.trim().to_lowercase())
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate(
                "User with this username already exists.",
            ));
        }

        let (role, is_approved) = classify_registration(&new.email, &self.doctor_domain);
        let identity = Identity::from_new(new, role, is_approved)?;
        self.store.insert_identity(&identity).await?;
        info!(
            email = %identity.email,
            username = %identity.username,
            role = %identity.role,
            approved = identity.is_approved,
            "identity registered"
        );

        let profile = if role == Role::Doctor {
            match self
                .store
                .put_profile(&DoctorProfile::placeholder(identity.id))
                .await
            {
                Ok(()) => {
                    info!(doctor = %identity.id, "doctor profile provisioned");
                    ProfileProvisioning::Created
                }
                Err(err) => {
                    // Accepted inconsistency: registration still succeeds,
                    // but the failure must stay visible to operators.
                    error!(doctor = %identity.id, error = %err, "failed to provision doctor profile");
                    ProfileProvisioning::Failed
                }
            }
        } else {
            ProfileProvisioning::NotRequired
        };

        let token = self.keys.issue(identity.id)?;
        let message = if role == Role::Doctor {
            "Registration successful! Your doctor account is pending admin approval.".to_string()
        } else {
            "Registration successful! You can now log in.".to_string()
        };

        Ok(RegistrationOutcome {
            identity,
            token,
            message,
            profile,
        })
    }

    /// Verifies credentials and issues a capability token. Unknown email
    /// and wrong password produce the same error; the approval gate is
    /// consulted only after the credentials check out.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<(Identity, String)> {
        let candidate = self.store.identity_by_email(email).await?;
        let verified = match candidate {
            Some(identity) => {
                if identity.verify_password(password)? {
                    Some(identity)
                } else {
                    None
                }
            }
            None => None,
        };
        let Some(identity) = verified else {
            info!(email = %email, "login rejected: invalid credentials");
            return Err(DomainError::authentication("Invalid email or password."));
        };

        if identity.role == Role::Doctor && !identity.is_approved {
            info!(email = %email, "login rejected: doctor pending approval");
            return Err(DomainError::conflict(
                "Your doctor account is pending admin approval. Please wait for an admin to approve your account.",
            ));
        }

        let token = self.keys.issue(identity.id)?;
        Ok((identity, token))
    }

    /// Resolves verified claims back to the identity they were bound to.
    pub async fn resolve_token(&self, claims: &Claims) -> DomainResult<Identity> {
        self.store
            .identity_by_id(claims.sub)
            .await?
            .ok_or_else(|| DomainError::authentication("Not authorized, user not found"))
    }
}
