// CLI tool for issuing a session token to a user.
// Run with: cargo run --bin issue-token -- <user_id> [--ttl-days N]
//
// The full token is printed once; only its hash is stored.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::env;

use taskping_storage::{generate_session_token, CreateAuthSession, Database};

#[derive(Debug)]
struct Args {
    user_id: i64,
    ttl_days: i64,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut user_id = None;
        let mut ttl_days = 30i64;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--ttl-days" | "-t" => {
                    i += 1;
                    ttl_days = args
                        .get(i)
                        .context("--ttl-days requires a value")?
                        .parse()
                        .context("Invalid ttl")?;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                arg => {
                    user_id = Some(arg.parse().context("Invalid user id")?);
                }
            }
            i += 1;
        }

        Ok(Self {
            user_id: user_id.context("user_id argument required")?,
            ttl_days,
        })
    }
}

fn print_help() {
    eprintln!("Usage: issue-token <user_id> [--ttl-days N]");
    eprintln!();
    eprintln!("Creates an auth session for the user and prints the bearer token.");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse()?;

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;

    let generated = generate_session_token();
    db.create_auth_session(CreateAuthSession {
        token_hash: generated.token_hash,
        user_id: args.user_id,
        expires_at: Utc::now() + Duration::days(args.ttl_days),
    })
    .await
    .context("Failed to create auth session")?;

    println!("{}", generated.token);
    Ok(())
}
