//! Person service: validation plus store orchestration.
//!
//! Handlers call this instead of the store so the rule set (including tax id
//! uniqueness) is applied the same way by the web routes and the CLI.

use thiserror::Error;
use tracing::instrument;

use pessoas_core::validation::messages;
use pessoas_core::{FieldErrors, PersonField, PersonFields, PersonId, PersonInput};

use crate::db::{PersonStore, RepositoryError};
use crate::models::Person;

/// Outcome of a failed person operation.
#[derive(Debug, Error)]
pub enum PersonError {
    /// One or more submitted fields broke a rule; nothing was written.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The referenced person does not exist.
    #[error("person {0} not found")]
    NotFound(PersonId),

    /// The store failed for an unexpected reason.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Person operations over any [`PersonStore`].
pub struct PersonService<'a> {
    store: &'a dyn PersonStore,
}

impl<'a> PersonService<'a> {
    /// Create a service over a store.
    #[must_use]
    pub const fn new(store: &'a dyn PersonStore) -> Self {
        Self { store }
    }

    /// All people in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `PersonError::Store` if the store fails.
    pub async fn list(&self) -> Result<Vec<Person>, PersonError> {
        Ok(self.store.list().await?)
    }

    /// One person by id.
    ///
    /// # Errors
    ///
    /// Returns `PersonError::NotFound` if no row has this id.
    pub async fn find(&self, id: PersonId) -> Result<Person, PersonError> {
        self.store
            .get(id)
            .await?
            .ok_or(PersonError::NotFound(id))
    }

    /// Validate and insert a new person.
    ///
    /// # Errors
    ///
    /// Returns `PersonError::Validation` when a rule fails, including a tax id
    /// already in use, and `PersonError::Store` for anything else.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &PersonInput) -> Result<Person, PersonError> {
        let fields = self.validate(input, None).await?;
        let person = self.store.create(&fields).await.map_err(conflict_as_cpf)?;
        tracing::info!(person_id = %person.id, "Person created");
        Ok(person)
    }

    /// Validate and overwrite an existing person.
    ///
    /// The person's own row is excluded from the uniqueness check, so keeping
    /// the same tax id is allowed.
    ///
    /// # Errors
    ///
    /// Returns `PersonError::NotFound` before validating if the id is unknown,
    /// `PersonError::Validation` when a rule fails and `PersonError::Store` for
    /// anything else.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: PersonId, input: &PersonInput) -> Result<Person, PersonError> {
        self.find(id).await?;
        let fields = self.validate(input, Some(id)).await?;
        let person = self
            .store
            .update(id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => PersonError::NotFound(id),
                other => conflict_as_cpf(other),
            })?;
        tracing::info!(person_id = %person.id, "Person updated");
        Ok(person)
    }

    /// Permanently remove a person.
    ///
    /// # Errors
    ///
    /// Returns `PersonError::NotFound` if the id is unknown and
    /// `PersonError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: PersonId) -> Result<(), PersonError> {
        self.store.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => PersonError::NotFound(id),
            other => PersonError::Store(other),
        })?;
        tracing::info!(person_id = %id, "Person deleted");
        Ok(())
    }

    /// Apply the field rules, then the uniqueness rule on `cpf`.
    ///
    /// Uniqueness is only checked when `cpf` passed its own rules, and its
    /// failure is reported alongside the other field errors.
    async fn validate(
        &self,
        input: &PersonInput,
        except: Option<PersonId>,
    ) -> Result<PersonFields, PersonError> {
        match input.validate() {
            Ok(fields) => {
                if self.store.cpf_taken(&fields.cpf, except).await? {
                    return Err(PersonError::Validation(FieldErrors::single(
                        PersonField::Cpf,
                        messages::CPF_UNIQUE,
                    )));
                }
                Ok(fields)
            }
            Err(mut errors) => {
                if !errors.contains(PersonField::Cpf)
                    && let Ok(cpf) = pessoas_core::TaxId::parse(cpf_text(input))
                    && self.store.cpf_taken(&cpf, except).await?
                {
                    errors.add(PersonField::Cpf, messages::CPF_UNIQUE);
                }
                Err(PersonError::Validation(errors))
            }
        }
    }
}

/// The trimmed `cpf` text of an input whose `cpf` passed the field rules.
fn cpf_text(input: &PersonInput) -> &str {
    match &input.cpf {
        Some(pessoas_core::RawValue::Text(text)) => text.trim(),
        _ => "",
    }
}

/// A unique violation that slipped past the pre-check (a concurrent insert)
/// is still a validation failure on `cpf`.
fn conflict_as_cpf(e: RepositoryError) -> PersonError {
    match e {
        RepositoryError::Conflict(_) => PersonError::Validation(FieldErrors::single(
            PersonField::Cpf,
            messages::CPF_UNIQUE,
        )),
        other => PersonError::Store(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryPersonStore;

    fn input(cpf: &str) -> PersonInput {
        PersonInput {
            nome: Some("Ana Silva".into()),
            cpf: Some(cpf.into()),
            tipo: Some("Física".into()),
            telefone: Some("11999999999".into()),
            email: Some("ana@example.com".into()),
        }
    }

    #[tokio::test]
    async fn test_create_persists_exact_values() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);

        let person = service.create(&input("123.456.789-00")).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![person.clone()]);
        assert_eq!(person.nome, "Ana Silva");
        assert_eq!(person.cpf.as_str(), "123.456.789-00");
        assert_eq!(person.tipo.as_str(), "Física");
        assert_eq!(person.telefone, "11999999999");
        assert_eq!(person.email.as_str(), "ana@example.com");
    }

    #[tokio::test]
    async fn test_create_duplicate_cpf_is_validation_error() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        service.create(&input("123.456.789-00")).await.unwrap();

        let err = service.create(&input("123.456.789-00")).await.unwrap_err();

        let PersonError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.get(PersonField::Cpf), Some(messages::CPF_UNIQUE));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_reported_with_other_field_errors() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        service.create(&input("123.456.789-00")).await.unwrap();

        let bad = PersonInput {
            tipo: Some("Outro".into()),
            ..input(" 123.456.789-00 ")
        };
        let PersonError::Validation(errors) = service.create(&bad).await.unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(errors.contains(PersonField::Tipo));
        assert_eq!(errors.get(PersonField::Cpf), Some(messages::CPF_UNIQUE));
    }

    #[tokio::test]
    async fn test_update_keeping_own_cpf_succeeds() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        let person = service.create(&input("123.456.789-00")).await.unwrap();

        let changed = PersonInput {
            nome: Some("Ana Souza".into()),
            ..input("123.456.789-00")
        };
        let updated = service.update(person.id, &changed).await.unwrap();

        assert_eq!(updated.id, person.id);
        assert_eq!(updated.nome, "Ana Souza");
    }

    #[tokio::test]
    async fn test_update_to_other_persons_cpf_fails() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        service.create(&input("111")).await.unwrap();
        let second = service.create(&input("222")).await.unwrap();

        let err = service.update(second.id, &input("111")).await.unwrap_err();

        assert!(matches!(err, PersonError::Validation(ref e) if e.contains(PersonField::Cpf)));
        assert_eq!(service.find(second.id).await.unwrap().cpf.as_str(), "222");
    }

    #[tokio::test]
    async fn test_update_missing_person_is_not_found_before_validation() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);

        let err = service
            .update(PersonId::new(99), &PersonInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PersonError::NotFound(id) if id == PersonId::new(99)));
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        let person = service.create(&input("111")).await.unwrap();

        let bad = PersonInput {
            email: None,
            ..input("111")
        };
        assert!(matches!(
            service.update(person.id, &bad).await,
            Err(PersonError::Validation(_))
        ));
        assert!(matches!(
            service.create(&PersonInput { nome: None, ..input("999") }).await,
            Err(PersonError::Validation(_))
        ));

        assert_eq!(service.list().await.unwrap(), vec![person]);
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let store = MemoryPersonStore::new();
        let service = PersonService::new(&store);
        let person = service.create(&input("111")).await.unwrap();

        service.delete(person.id).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.find(person.id).await,
            Err(PersonError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(person.id).await,
            Err(PersonError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let store = MemoryPersonStore::new();
        store.set_unavailable(true);
        let service = PersonService::new(&store);

        let err = service.create(&input("111")).await.unwrap_err();
        assert!(matches!(err, PersonError::Store(_)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_cpf() {
        let store = Arc::new(MemoryPersonStore::new());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    PersonService::new(store.as_ref())
                        .create(&input("123.456.789-00"))
                        .await
                        .is_ok()
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
