//! Print every stored person.

use sqlx::PgPool;

use pessoas_web::db::PersonRepository;
use pessoas_web::services::PersonService;

use super::CliError;

/// Print one line per person in id order.
#[allow(clippy::print_stdout)]
pub async fn run(pool: &PgPool) -> Result<(), CliError> {
    let repo = PersonRepository::new(pool.clone());
    let people = PersonService::new(&repo).list().await?;

    if people.is_empty() {
        println!("No people registered.");
        return Ok(());
    }

    println!("{:>5}  {:<30}  {:<18}  {:<8}", "ID", "NOME", "CPF/CNPJ", "TIPO");
    for person in &people {
        println!(
            "{:>5}  {:<30}  {:<18}  {:<8}",
            person.id.to_string(),
            person.nome,
            person.cpf.as_str(),
            person.tipo.as_str()
        );
    }
    println!("{} people", people.len());

    Ok(())
}
