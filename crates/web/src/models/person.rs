//! Person record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pessoas_core::{Email, PersonFields, PersonId, PersonKind, TaxId};

/// A stored person, individual or corporate.
///
/// Plain data: persistence goes through [`crate::db::PersonStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub nome: String,
    pub cpf: TaxId,
    pub tipo: PersonKind,
    pub telefone: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Build a record from validated fields and store-assigned metadata.
    #[must_use]
    pub fn from_fields(
        id: PersonId,
        fields: PersonFields,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            nome: fields.nome,
            cpf: fields.cpf,
            tipo: fields.tipo,
            telefone: fields.telefone,
            email: fields.email,
            created_at,
            updated_at,
        }
    }
}
