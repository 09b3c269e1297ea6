//! Seed the database with demo people.
//!
//! Records go through [`PersonService`], so they obey the same rules as the
//! web forms. A record whose tax id is already stored is skipped, which makes
//! the command safe to run repeatedly.

use sqlx::PgPool;

use pessoas_core::{PersonField, PersonInput, PersonKind};
use pessoas_web::db::PersonRepository;
use pessoas_web::services::{PersonError, PersonService};

use super::CliError;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fábio", "Gabriela", "Heitor", "Isabela", "João",
];
const LAST_NAMES: &[&str] = &[
    "Silva", "Souza", "Oliveira", "Santos", "Pereira", "Costa", "Almeida", "Ribeiro",
];
const COMPANY_SUFFIXES: &[&str] = &["Comércio Ltda", "Serviços S.A.", "Tecnologia ME"];

/// Insert up to `count` demo people; returns how many were created.
pub async fn run(pool: &PgPool, count: u32) -> Result<u32, CliError> {
    let repo = PersonRepository::new(pool.clone());
    let service = PersonService::new(&repo);

    let mut created = 0;
    let mut skipped = 0;
    for n in 0..count {
        match service.create(&demo_person(n)).await {
            Ok(person) => {
                tracing::debug!(person_id = %person.id, "Seeded person");
                created += 1;
            }
            Err(PersonError::Validation(errors))
                if errors.len() == 1 && errors.contains(PersonField::Cpf) =>
            {
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(created, skipped, "Seeding complete");
    Ok(created)
}

/// The `n`-th demo person. Every third one is a company with a CNPJ.
fn demo_person(n: u32) -> PersonInput {
    let pick = |list: &[&'static str], salt: u32| -> &'static str {
        let len = u32::try_from(list.len()).unwrap_or(u32::MAX);
        list.get((n.wrapping_add(salt) % len) as usize).copied().unwrap_or_default()
    };
    let first = pick(FIRST_NAMES, 0);
    let last = pick(LAST_NAMES, n / 3);

    let (nome, cpf, kind) = if n % 3 == 2 {
        (
            format!("{last} {}", pick(COMPANY_SUFFIXES, 0)),
            format!(
                "{:02}.{:03}.{:03}/0001-{:02}",
                n / 1_000_000 % 100,
                n / 1000 % 1000,
                n % 1000,
                n % 97
            ),
            PersonKind::Corporate,
        )
    } else {
        (
            format!("{first} {last}"),
            format!(
                "{:03}.{:03}.{:03}-{:02}",
                n / 1_000_000 % 1000,
                n / 1000 % 1000,
                n % 1000,
                n % 97
            ),
            PersonKind::Individual,
        )
    };

    PersonInput {
        email: Some(format!("{}.{}{n}@example.com", ascii_lower(first), ascii_lower(last)).into()),
        telefone: Some(format!("(11) 9{:04}-{:04}", n % 10_000, n.wrapping_mul(7) % 10_000).into()),
        tipo: Some(kind.as_str().into()),
        nome: Some(nome.into()),
        cpf: Some(cpf.into()),
    }
}

/// Lowercase with accents dropped, for e-mail local parts.
fn ascii_lower(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_demo_people_are_valid() {
        for n in [0, 1, 2, 5, 99, 1001, 1234, 999_999, 12_345_678] {
            let fields = demo_person(n).validate();
            assert!(fields.is_ok(), "demo person {n} invalid: {fields:?}");
        }
    }

    #[test]
    fn test_demo_tax_ids_are_distinct() {
        let ids: HashSet<_> = (0..500)
            .chain(999_900..1_000_100)
            .map(|n| demo_person(n).validate().unwrap().cpf)
            .collect();
        assert_eq!(ids.len(), 700);
    }

    #[test]
    fn test_every_third_is_corporate() {
        let fields = demo_person(2).validate().unwrap();
        assert_eq!(fields.tipo, PersonKind::Corporate);
        assert_eq!(fields.cpf.as_str().len(), 18);

        let fields = demo_person(0).validate().unwrap();
        assert_eq!(fields.tipo, PersonKind::Individual);
    }

    #[test]
    fn test_ascii_lower() {
        assert_eq!(ascii_lower("Fábio"), "fabio");
        assert_eq!(ascii_lower("João"), "joao");
    }
}
