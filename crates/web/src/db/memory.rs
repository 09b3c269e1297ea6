//! In-memory person store.
//!
//! Keeps rows in a `Vec` behind a lock; the uniqueness check and the write
//! happen under the same write guard, so concurrent writers with one tax id
//! behave like the unique index. Used by tests and local tooling.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use pessoas_core::{PersonFields, PersonId, TaxId};

use super::{PersonStore, RepositoryError};
use crate::models::Person;

#[derive(Default)]
struct Rows {
    next_id: i32,
    people: Vec<Person>,
}

impl Rows {
    fn cpf_taken(&self, cpf: &TaxId, except: Option<PersonId>) -> bool {
        self.people
            .iter()
            .any(|p| &p.cpf == cpf && Some(p.id) != except)
    }
}

/// Person store held in process memory.
#[derive(Default)]
pub struct MemoryPersonStore {
    rows: RwLock<Rows>,
    unavailable: AtomicBool,
}

impl MemoryPersonStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn list(&self) -> Result<Vec<Person>, RepositoryError> {
        self.check_available()?;
        Ok(self.rows.read().await.people.clone())
    }

    async fn get(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        self.check_available()?;
        let rows = self.rows.read().await;
        Ok(rows.people.iter().find(|p| p.id == id).cloned())
    }

    async fn cpf_taken(
        &self,
        cpf: &TaxId,
        except: Option<PersonId>,
    ) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.rows.read().await.cpf_taken(cpf, except))
    }

    async fn create(&self, fields: &PersonFields) -> Result<Person, RepositoryError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        if rows.cpf_taken(&fields.cpf, None) {
            return Err(RepositoryError::Conflict("cpf already exists".to_owned()));
        }

        rows.next_id += 1;
        let now = Utc::now();
        let person = Person::from_fields(PersonId::new(rows.next_id), fields.clone(), now, now);
        rows.people.push(person.clone());
        Ok(person)
    }

    async fn update(
        &self,
        id: PersonId,
        fields: &PersonFields,
    ) -> Result<Person, RepositoryError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        if rows.cpf_taken(&fields.cpf, Some(id)) {
            return Err(RepositoryError::Conflict("cpf already exists".to_owned()));
        }

        let person = rows
            .people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        *person = Person::from_fields(id, fields.clone(), person.created_at, Utc::now());
        Ok(person.clone())
    }

    async fn delete(&self, id: PersonId) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let before = rows.people.len();
        rows.people.retain(|p| p.id != id);
        if rows.people.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pessoas_core::PersonInput;

    use super::*;

    fn fields(cpf: &str) -> PersonFields {
        PersonInput {
            nome: Some("Ana Silva".into()),
            cpf: Some(cpf.into()),
            tipo: Some("Física".into()),
            telefone: Some("11999999999".into()),
            email: Some("ana@example.com".into()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_listed_in_order() {
        let store = MemoryPersonStore::new();
        let a = store.create(&fields("111")).await.unwrap();
        let b = store.create(&fields("222")).await.unwrap();
        assert_eq!(a.id, PersonId::new(1));
        assert_eq!(b.id, PersonId::new(2));

        let ids: Vec<_> = store.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_duplicate_cpf_conflicts() {
        let store = MemoryPersonStore::new();
        store.create(&fields("111")).await.unwrap();
        let err = store.create(&fields("111")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cpf_taken_excludes_own_row() {
        let store = MemoryPersonStore::new();
        let a = store.create(&fields("111")).await.unwrap();
        let cpf = TaxId::parse("111").unwrap();
        assert!(store.cpf_taken(&cpf, None).await.unwrap());
        assert!(!store.cpf_taken(&cpf, Some(a.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let store = MemoryPersonStore::new();
        let a = store.create(&fields("111")).await.unwrap();
        let updated = store.update(a.id, &fields("333")).await.unwrap();
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.created_at, a.created_at);
        assert_eq!(updated.cpf.as_str(), "333");
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = MemoryPersonStore::new();
        let a = store.create(&fields("111")).await.unwrap();
        store.delete(a.id).await.unwrap();
        assert!(store.get(a.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(a.id).await,
            Err(RepositoryError::NotFound)
        ));
        // ids are never reused
        let b = store.create(&fields("111")).await.unwrap();
        assert_eq!(b.id, PersonId::new(2));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryPersonStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list().await,
            Err(RepositoryError::Database(_))
        ));
        assert!(store.ping().await.is_err());
    }
}
