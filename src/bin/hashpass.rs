//! Seed helper for staff accounts.
//!
//! `hashpass <password>` prints the Argon2 PHC string.
//! `hashpass <password> <email> <full name> [gerente|atendente]` prints a
//! ready-to-run `INSERT INTO app_user` statement instead.

use anyhow::bail;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(password) = args.first() else {
        bail!("usage: hashpass <password> [email \"full name\" [cargo]]");
    };

    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))?
        .to_string();

    match &args[1..] {
        [] => println!("{phc}"),
        [email, full_name, rest @ ..] => {
            let cargo = rest.first().map(String::as_str).unwrap_or("atendente");
            if cargo != "gerente" && cargo != "atendente" {
                bail!("cargo must be gerente or atendente, got {cargo}");
            }
            println!(
                "INSERT INTO app_user (email, full_name, password_hash, cargo) VALUES ({}, {}, {}, {});",
                sql_quote(email),
                sql_quote(full_name),
                sql_quote(&phc),
                sql_quote(cargo),
            );
        }
        [_] => bail!("seeding needs both email and full name"),
    }
    Ok(())
}
