use medication_reminders_infra::run_migration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    run_migration().await?;
    println!("Migrations applied");
    Ok(())
}
