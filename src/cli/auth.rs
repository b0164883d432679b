use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db, upsert_refresh_token};
use crate::google::oauth::{authorization_url, exchange_code_for_token};
use anyhow::{Result, anyhow};
use std::io::{self, Write};

const SERVICE: &str = "google";

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

/// Walk through the consent flow for `email` and store the resulting
/// refresh token so slot searches can read that account's calendars.
pub async fn run(email: Option<String>) -> Result<()> {
    let config = AppConfig::default();

    let email = match email {
        Some(email) => email,
        None => prompt("Enter the email address you are authenticating: ")?,
    };
    if email.is_empty() {
        return Err(anyhow!("An email address is required"));
    }

    let auth_url = authorization_url(&config.google_client_id, &config.google_redirect_uri);
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    let code = prompt("Paste the authorization code shown by Google here: ")?;

    let token = exchange_code_for_token(
        &config.google_token_url,
        &config.google_client_id,
        &config.google_client_secret,
        &code,
        &config.google_redirect_uri,
    )
    .await?;

    // Store the refresh token in the DB and use that to fetch an access token from now on.
    let refresh_token = token
        .refresh_token
        .ok_or(anyhow!("No refresh token in response"))?;

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    upsert_refresh_token(&db, &email, SERVICE, &refresh_token).await?;
    println!("Refresh token for {} saved to DB.", email);

    Ok(())
}
