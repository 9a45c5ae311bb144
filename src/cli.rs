use sqlx::SqlitePool;

use crate::models::Host;

pub async fn create_host(
    pool: &SqlitePool,
    name: &str,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = email.trim().to_lowercase();
    let host = Host::new(name.to_string(), email);

    sqlx::query(
        "INSERT INTO hosts (id, name, email, access_code, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&host.id)
    .bind(&host.name)
    .bind(&host.email)
    .bind(&host.access_code)
    .bind(&host.created_at)
    .bind(&host.updated_at)
    .execute(pool)
    .await?;

    println!("Created host:");
    println!("  ID: {}", host.id);
    println!("  Name: {}", host.name);
    println!("  Email: {}", host.email);
    println!("  Access Code: {}", host.access_code);

    Ok(())
}
