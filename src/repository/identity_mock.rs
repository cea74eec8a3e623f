#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::identity::{Identity, IdentityPatch, IdentityRepository, NewIdentity};
use crate::{AuthError, ConflictField};

/// In-memory identity store for tests.
#[derive(Clone, Default)]
pub struct MockIdentityRepository {
    pub identities: Arc<Mutex<Vec<Identity>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an identity, assigning it the next free id.
    pub fn seed(&self, mut identity: Identity) -> Identity {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        identity.id = *next;
        self.identities.lock().unwrap().push(identity.clone());
        identity
    }

    fn conflict_check(
        identities: &[Identity],
        exclude_id: Option<i64>,
        username: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), AuthError> {
        for other in identities {
            if Some(other.id) == exclude_id {
                continue;
            }
            if email.is_some_and(|e| other.email == e) {
                return Err(AuthError::Conflict(ConflictField::Email));
            }
            if username.is_some_and(|u| other.username == u) {
                return Err(AuthError::Conflict(ConflictField::Username));
            }
            if phone.is_some_and(|p| other.phone_number.as_deref() == Some(p)) {
                return Err(AuthError::Conflict(ConflictField::PhoneNumber));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityRepository for MockIdentityRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| i.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().find(|i| i.email == email).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .iter()
            .find(|i| i.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, AuthError> {
        let mut identities = self.identities.lock().unwrap();
        Self::conflict_check(
            &identities,
            None,
            Some(&new.username),
            Some(&new.email),
            new.phone_number.as_deref(),
        )?;

        let mut next = self.next_id.lock().unwrap();
        *next += 1;

        let now = Utc::now();
        let identity = Identity {
            id: *next,
            username: new.username,
            email: new.email,
            phone_number: new.phone_number,
            hashed_password: new.hashed_password,
            full_name: new.full_name,
            is_active: true,
            is_admin: false,
            phone_verified: false,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        identities.push(identity.clone());
        Ok(identity)
    }

    async fn update(&self, id: i64, patch: IdentityPatch) -> Result<Identity, AuthError> {
        let mut identities = self.identities.lock().unwrap();
        Self::conflict_check(
            &identities,
            Some(id),
            patch.username.as_deref(),
            patch.email.as_deref(),
            patch.phone_number.as_deref(),
        )?;

        let identity = identities
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AuthError::StoreUnavailable("identity vanished".to_owned()))?;

        if let Some(username) = patch.username {
            identity.username = username;
        }
        if let Some(email) = patch.email {
            identity.email = email;
        }
        if let Some(phone_number) = patch.phone_number {
            identity.phone_number = Some(phone_number);
        }
        if let Some(hashed_password) = patch.hashed_password {
            identity.hashed_password = hashed_password;
        }
        if let Some(full_name) = patch.full_name {
            identity.full_name = Some(full_name);
        }
        identity.updated_at = Utc::now();

        Ok(identity.clone())
    }

    async fn mark_phone_verified(&self, id: i64) -> Result<(), AuthError> {
        let mut identities = self.identities.lock().unwrap();
        if let Some(identity) = identities.iter_mut().find(|i| i.id == id) {
            identity.phone_verified = true;
            identity.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_email_verified(&self, id: i64) -> Result<(), AuthError> {
        let mut identities = self.identities.lock().unwrap();
        if let Some(identity) = identities.iter_mut().find(|i| i.id == id) {
            identity.email_verified = true;
            identity.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MockIdentityRepository::new();
        let created = repo
            .create(NewIdentity {
                username: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                phone_number: Some("5551234567".to_owned()),
                hashed_password: "hash".to_owned(),
                full_name: Some("Alice".to_owned()),
            })
            .await
            .unwrap();

        assert!(created.is_active);
        assert!(!created.is_admin);
        assert!(!created.phone_verified);

        assert!(repo.find_by_username("alice").await.unwrap().is_some());
        assert!(repo.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(repo.find_by_phone("5551234567").await.unwrap().is_some());
        assert!(repo.find_by_id(created.id).await.unwrap().is_some());
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_conflicts() {
        let repo = MockIdentityRepository::new();
        repo.create(NewIdentity {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            phone_number: Some("5551234567".to_owned()),
            hashed_password: "hash".to_owned(),
            full_name: None,
        })
        .await
        .unwrap();

        let err = repo
            .create(NewIdentity {
                username: "alice2".to_owned(),
                email: "alice@example.com".to_owned(),
                phone_number: None,
                hashed_password: "hash".to_owned(),
                full_name: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Conflict(ConflictField::Email));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = MockIdentityRepository::new();
        let identity = repo
            .create(NewIdentity {
                username: "temp_5551234567".to_owned(),
                email: "temp_5551234567@placeholder.invalid".to_owned(),
                phone_number: Some("5551234567".to_owned()),
                hashed_password: "old".to_owned(),
                full_name: None,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                identity.id,
                IdentityPatch {
                    username: Some("alice".to_owned()),
                    hashed_password: Some("new".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "alice");
        assert_eq!(updated.hashed_password, "new");
        // untouched fields survive
        assert_eq!(updated.email, "temp_5551234567@placeholder.invalid");
        assert_eq!(updated.phone_number.as_deref(), Some("5551234567"));
    }

    #[tokio::test]
    async fn test_update_conflict_excludes_self() {
        let repo = MockIdentityRepository::new();
        let identity = repo
            .create(NewIdentity {
                username: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                phone_number: None,
                hashed_password: "hash".to_owned(),
                full_name: None,
            })
            .await
            .unwrap();

        // re-asserting your own unique values is not a conflict
        let result = repo
            .update(
                identity.id,
                IdentityPatch {
                    username: Some("alice".to_owned()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_verification_flags_one_way() {
        let repo = MockIdentityRepository::new();
        let identity = repo.seed(Identity::mock(0, "alice"));

        repo.mark_phone_verified(identity.id).await.unwrap();
        repo.mark_email_verified(identity.id).await.unwrap();

        let found = repo.find_by_id(identity.id).await.unwrap().unwrap();
        assert!(found.phone_verified);
        assert!(found.email_verified);
    }
}
