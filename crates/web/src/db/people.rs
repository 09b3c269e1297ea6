//! `PostgreSQL` person repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pessoas_core::{Email, PersonFields, PersonId, PersonKind, TaxId};

use super::{PersonStore, RepositoryError};
use crate::models::Person;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `pessoas` queries.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: i32,
    nome: String,
    cpf: String,
    tipo: String,
    telefone: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PersonRow> for Person {
    type Error = RepositoryError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let cpf = TaxId::parse(&row.cpf).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cpf in database: {e}"))
        })?;
        let tipo = row
            .tipo
            .parse::<PersonKind>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: PersonId::new(row.id),
            nome: row.nome,
            cpf,
            tipo,
            telefone: row.telefone,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique violation on `cpf` to [`RepositoryError::Conflict`].
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("cpf already exists".to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for person database operations.
#[derive(Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    /// Create a new person repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PersonRepository {
    async fn list(&self) -> Result<Vec<Person>, RepositoryError> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT id, nome, cpf, tipo, telefone, email, created_at, updated_at
            FROM pessoas
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT id, nome, cpf, tipo, telefone, email, created_at, updated_at
            FROM pessoas
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn cpf_taken(
        &self,
        cpf: &TaxId,
        except: Option<PersonId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM pessoas
                WHERE cpf = $1 AND ($2::INTEGER IS NULL OR id <> $2)
            )
            ",
        )
        .bind(cpf.as_str())
        .bind(except.map(|id| id.as_i32()))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn create(&self, fields: &PersonFields) -> Result<Person, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            INSERT INTO pessoas (nome, cpf, tipo, telefone, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, cpf, tipo, telefone, email, created_at, updated_at
            ",
        )
        .bind(&fields.nome)
        .bind(fields.cpf.as_str())
        .bind(fields.tipo.as_str())
        .bind(&fields.telefone)
        .bind(fields.email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn update(
        &self,
        id: PersonId,
        fields: &PersonFields,
    ) -> Result<Person, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            UPDATE pessoas
            SET nome = $1, cpf = $2, tipo = $3, telefone = $4, email = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, nome, cpf, tipo, telefone, email, created_at, updated_at
            ",
        )
        .bind(&fields.nome)
        .bind(fields.cpf.as_str())
        .bind(fields.tipo.as_str())
        .bind(&fields.telefone)
        .bind(fields.email.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, id: PersonId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pessoas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
