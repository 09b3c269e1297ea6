//! Validation rules for person submissions.
//!
//! A submission arrives as loosely typed key-value data (an HTML form or a
//! JSON body) and is turned into [`PersonFields`] or a [`FieldErrors`] map
//! with one pt-BR message per failing field.
//!
//! Before the rules run, text values are trimmed and empty strings count as
//! absent. Lengths are measured in characters. Every field is checked
//! independently and the first failing rule of a field supplies its message.
//!
//! The uniqueness of `cpf` needs the store and is therefore checked by the
//! caller, after these rules pass; [`messages::CPF_UNIQUE`] is its message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError, PersonKind, TaxId, TaxIdError};

/// Maximum length of `nome`, in characters.
pub const NOME_MAX_LENGTH: usize = 100;

/// Maximum length of `telefone`, in characters.
pub const TELEFONE_MAX_LENGTH: usize = 20;

/// User-facing validation messages.
pub mod messages {
    pub const NOME_REQUIRED: &str = "O campo nome é obrigatório.";
    pub const NOME_STRING: &str = "O campo nome deve ser um texto.";
    pub const NOME_MAX: &str = "O campo nome não pode ter mais de 100 caracteres.";

    pub const CPF_REQUIRED: &str = "O campo CPF/CNPJ é obrigatório.";
    pub const CPF_STRING: &str = "O campo CPF/CNPJ deve ser um texto.";
    pub const CPF_MAX: &str = "O campo CPF/CNPJ não pode ter mais de 18 caracteres.";
    pub const CPF_UNIQUE: &str = "Este CPF/CNPJ já está cadastrado.";

    pub const TIPO_REQUIRED: &str = "O campo tipo é obrigatório.";
    pub const TIPO_IN: &str = "O tipo selecionado é inválido.";

    pub const TELEFONE_REQUIRED: &str = "O campo telefone é obrigatório.";
    pub const TELEFONE_STRING: &str = "O campo telefone deve ser um texto.";
    pub const TELEFONE_MAX: &str = "O campo telefone não pode ter mais de 20 caracteres.";

    pub const EMAIL_REQUIRED: &str = "O campo email é obrigatório.";
    pub const EMAIL_EMAIL: &str = "Digite um email válido.";
    pub const EMAIL_MAX: &str = "O campo email não pode ter mais de 100 caracteres.";
}

/// A submitted value before validation.
///
/// Form bodies only ever produce [`RawValue::Text`]; JSON bodies can carry
/// numbers, booleans, arrays or objects, which fail the "is a string" rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Other(serde_json::Value),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Raw person submission, as received from a create or update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonInput {
    pub nome: Option<RawValue>,
    pub cpf: Option<RawValue>,
    pub tipo: Option<RawValue>,
    pub telefone: Option<RawValue>,
    pub email: Option<RawValue>,
}

/// The validated, normalized fields of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
    pub nome: String,
    pub cpf: TaxId,
    pub tipo: PersonKind,
    pub telefone: String,
    pub email: Email,
}

impl From<&PersonFields> for PersonInput {
    fn from(fields: &PersonFields) -> Self {
        Self {
            nome: Some(fields.nome.as_str().into()),
            cpf: Some(fields.cpf.as_str().into()),
            tipo: Some(fields.tipo.as_str().into()),
            telefone: Some(fields.telefone.as_str().into()),
            email: Some(fields.email.as_str().into()),
        }
    }
}

/// A field of the person form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonField {
    Nome,
    Cpf,
    Tipo,
    Telefone,
    Email,
}

impl PersonField {
    /// The form key of this field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nome => "nome",
            Self::Cpf => "cpf",
            Self::Tipo => "tipo",
            Self::Telefone => "telefone",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for PersonField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures, one message per field.
///
/// Serializes as a flat `{"field": "message"}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<PersonField, String>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for a field. The first message recorded wins.
    pub fn add(&mut self, field: PersonField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Error set holding a single message.
    #[must_use]
    pub fn single(field: PersonField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// The message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: PersonField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether a field failed validation.
    #[must_use]
    pub fn contains(&self, field: PersonField) -> bool {
        self.0.contains_key(&field)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields in form order.
    pub fn fields(&self) -> impl Iterator<Item = PersonField> + '_ {
        self.0.keys().copied()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A raw value after trimming.
enum Presence<'a> {
    Missing,
    NotText,
    Text(&'a str),
}

fn presence(value: Option<&RawValue>) -> Presence<'_> {
    match value {
        None | Some(RawValue::Other(serde_json::Value::Null)) => Presence::Missing,
        Some(RawValue::Other(_)) => Presence::NotText,
        Some(RawValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Presence::Missing
            } else {
                Presence::Text(trimmed)
            }
        }
    }
}

/// required|string|max rule chain for a plain text field.
fn bounded_text(
    value: Option<&RawValue>,
    max: usize,
    (required, string, too_long): (&str, &str, &str),
) -> Result<String, String> {
    match presence(value) {
        Presence::Missing => Err(required.to_owned()),
        Presence::NotText => Err(string.to_owned()),
        Presence::Text(text) if text.chars().count() > max => Err(too_long.to_owned()),
        Presence::Text(text) => Ok(text.to_owned()),
    }
}

impl PersonInput {
    /// Apply the field rules.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message when at least one rule
    /// fails.
    pub fn validate(&self) -> Result<PersonFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let nome = bounded_text(
            self.nome.as_ref(),
            NOME_MAX_LENGTH,
            (
                messages::NOME_REQUIRED,
                messages::NOME_STRING,
                messages::NOME_MAX,
            ),
        )
        .map_err(|message| errors.add(PersonField::Nome, message))
        .ok();

        let cpf = match presence(self.cpf.as_ref()) {
            Presence::Missing => Err(messages::CPF_REQUIRED),
            Presence::NotText => Err(messages::CPF_STRING),
            Presence::Text(text) => TaxId::parse(text).map_err(|e| match e {
                TaxIdError::Empty => messages::CPF_REQUIRED,
                TaxIdError::TooLong { .. } => messages::CPF_MAX,
            }),
        }
        .map_err(|message| errors.add(PersonField::Cpf, message))
        .ok();

        let tipo = match presence(self.tipo.as_ref()) {
            Presence::Missing => Err(messages::TIPO_REQUIRED),
            Presence::NotText => Err(messages::TIPO_IN),
            Presence::Text(text) => text.parse::<PersonKind>().map_err(|_| messages::TIPO_IN),
        }
        .map_err(|message| errors.add(PersonField::Tipo, message))
        .ok();

        let telefone = bounded_text(
            self.telefone.as_ref(),
            TELEFONE_MAX_LENGTH,
            (
                messages::TELEFONE_REQUIRED,
                messages::TELEFONE_STRING,
                messages::TELEFONE_MAX,
            ),
        )
        .map_err(|message| errors.add(PersonField::Telefone, message))
        .ok();

        let email = match presence(self.email.as_ref()) {
            Presence::Missing => Err(messages::EMAIL_REQUIRED),
            Presence::NotText => Err(messages::EMAIL_EMAIL),
            Presence::Text(text) => Email::parse(text).map_err(|e| match e {
                EmailError::Empty => messages::EMAIL_REQUIRED,
                EmailError::TooLong { .. } => messages::EMAIL_MAX,
                EmailError::Malformed => messages::EMAIL_EMAIL,
            }),
        }
        .map_err(|message| errors.add(PersonField::Email, message))
        .ok();

        match (nome, cpf, tipo, telefone, email) {
            (Some(nome), Some(cpf), Some(tipo), Some(telefone), Some(email)) => Ok(PersonFields {
                nome,
                cpf,
                tipo,
                telefone,
                email,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ana() -> PersonInput {
        PersonInput {
            nome: Some("Ana Silva".into()),
            cpf: Some("123.456.789-00".into()),
            tipo: Some("Física".into()),
            telefone: Some("11999999999".into()),
            email: Some("ana@example.com".into()),
        }
    }

    #[test]
    fn test_valid_input() {
        let fields = ana().validate().unwrap();
        assert_eq!(fields.nome, "Ana Silva");
        assert_eq!(fields.cpf.as_str(), "123.456.789-00");
        assert_eq!(fields.tipo, PersonKind::Individual);
        assert_eq!(fields.telefone, "11999999999");
        assert_eq!(fields.email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_values_are_trimmed() {
        let input = PersonInput {
            nome: Some("  Ana Silva ".into()),
            cpf: Some(" 123.456.789-00".into()),
            ..ana()
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.nome, "Ana Silva");
        assert_eq!(fields.cpf.as_str(), "123.456.789-00");
    }

    #[test]
    fn test_each_missing_field_is_named() {
        let cases: [(fn(&mut PersonInput), PersonField, &str); 5] = [
            (|i| i.nome = None, PersonField::Nome, messages::NOME_REQUIRED),
            (|i| i.cpf = None, PersonField::Cpf, messages::CPF_REQUIRED),
            (|i| i.tipo = None, PersonField::Tipo, messages::TIPO_REQUIRED),
            (
                |i| i.telefone = None,
                PersonField::Telefone,
                messages::TELEFONE_REQUIRED,
            ),
            (|i| i.email = None, PersonField::Email, messages::EMAIL_REQUIRED),
        ];

        for (clear, field, message) in cases {
            let mut input = ana();
            clear(&mut input);
            let errors = input.validate().unwrap_err();
            assert_eq!(errors.len(), 1, "{field}");
            assert_eq!(errors.get(field), Some(message));
        }
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let input = PersonInput {
            nome: Some("   ".into()),
            ..ana()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get(PersonField::Nome), Some(messages::NOME_REQUIRED));
    }

    #[test]
    fn test_empty_input_fails_every_field() {
        let errors = PersonInput::default().validate().unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_tipo_outside_enumeration() {
        for tipo in ["Fisica", "física", "Empresa"] {
            let input = PersonInput {
                tipo: Some(tipo.into()),
                ..ana()
            };
            let errors = input.validate().unwrap_err();
            assert_eq!(errors.get(PersonField::Tipo), Some(messages::TIPO_IN));
        }
    }

    #[test]
    fn test_max_lengths() {
        let input = PersonInput {
            nome: Some("a".repeat(101).into()),
            cpf: Some("1".repeat(19).into()),
            telefone: Some("9".repeat(21).into()),
            email: Some(format!("{}@example.com", "a".repeat(89)).into()),
            ..ana()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get(PersonField::Nome), Some(messages::NOME_MAX));
        assert_eq!(errors.get(PersonField::Cpf), Some(messages::CPF_MAX));
        assert_eq!(errors.get(PersonField::Telefone), Some(messages::TELEFONE_MAX));
        assert_eq!(errors.get(PersonField::Email), Some(messages::EMAIL_MAX));
        assert!(!errors.contains(PersonField::Tipo));
    }

    #[test]
    fn test_lengths_at_limit_pass() {
        let input = PersonInput {
            nome: Some("é".repeat(100).into()),
            cpf: Some("12.345.678/0001-90".into()),
            telefone: Some("9".repeat(20).into()),
            ..ana()
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let input = PersonInput {
            email: Some("ana.example.com".into()),
            ..ana()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get(PersonField::Email), Some(messages::EMAIL_EMAIL));
    }

    #[test]
    fn test_non_text_json_values() {
        let input: PersonInput = serde_json::from_value(json!({
            "nome": 42,
            "cpf": ["123"],
            "tipo": true,
            "telefone": {"ddd": "11"},
            "email": 1.5
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get(PersonField::Nome), Some(messages::NOME_STRING));
        assert_eq!(errors.get(PersonField::Cpf), Some(messages::CPF_STRING));
        assert_eq!(errors.get(PersonField::Tipo), Some(messages::TIPO_IN));
        assert_eq!(errors.get(PersonField::Telefone), Some(messages::TELEFONE_STRING));
        assert_eq!(errors.get(PersonField::Email), Some(messages::EMAIL_EMAIL));
    }

    #[test]
    fn test_json_null_is_missing() {
        let input: PersonInput = serde_json::from_value(json!({
            "nome": null,
            "cpf": "123.456.789-00",
            "tipo": "Jurídica",
            "telefone": "1133334444",
            "email": "contato@empresa.com.br"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![PersonField::Nome]);
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add(PersonField::Cpf, messages::CPF_MAX);
        errors.add(PersonField::Cpf, messages::CPF_UNIQUE);
        assert_eq!(errors.get(PersonField::Cpf), Some(messages::CPF_MAX));
    }

    #[test]
    fn test_errors_serialize_as_flat_object() {
        let errors = FieldErrors::single(PersonField::Cpf, messages::CPF_UNIQUE);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"cpf": "Este CPF/CNPJ já está cadastrado."})
        );
    }

    #[test]
    fn test_fields_round_back_into_input() {
        let fields = ana().validate().unwrap();
        assert_eq!(PersonInput::from(&fields), ana());
    }
}
