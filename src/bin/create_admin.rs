//! One-shot CLI to seed an admin account:
//!
//! ```text
//! create-admin <username> <email> <full name> <password>
//! ```
//!
//! The account is created as an active super_admin. Reads DATABASE_URL from
//! the environment (or .env).

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: create-admin <username> <email> <full name> <password>");
        std::process::exit(1);
    }
    let (username, email, full_name, password) = (&args[1], &args[2], &args[3], &args[4]);

    if password.len() < 6 {
        eprintln!("Password must be at least 6 characters");
        std::process::exit(1);
    }

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => hash.to_string(),
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to connect to the database: {}", e);
            std::process::exit(1);
        }
    };

    let result = sqlx::query(
        "INSERT INTO admin_users (username, email, password, full_name, role, status)
         VALUES ($1, $2, $3, $4, 'super_admin', 'active')",
    )
    .bind(username)
    .bind(email)
    .bind(&hash)
    .bind(full_name)
    .execute(&pool)
    .await;

    match result {
        Ok(_) => println!("Admin '{}' created", username),
        Err(e) => {
            eprintln!("Failed to create admin: {}", e);
            std::process::exit(1);
        }
    }
}
