use super::context::{AppContext, ContextOptions};
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use suraksh_core::SurakshError;
use suraksh_core::backend::{IntelligenceBackend, Registration};
use suraksh_core::navigation::Route;

pub async fn login(options: &ContextOptions, username: &str, password: Option<String>) -> Result<()> {
    let ctx = AppContext::new(options, Route::Login)?;
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    match ctx.auth().login(username, &password).await {
        Ok(profile) => {
            println!(
                "✅ Signed in as {} <{}> (clearance {})",
                profile.username, profile.email, profile.clearance_level
            );
            Ok(())
        }
        // On the login view a rejected login is an ordinary message.
        Err(SurakshError::Authorization(detail)) => bail!("Login failed: {}", detail),
        Err(e) => Err(e.into()),
    }
}

/// Creates an account on the backend. Does not sign in.
pub async fn register(
    options: &ContextOptions,
    username: &str,
    email: &str,
    clearance: &str,
    password: Option<String>,
) -> Result<()> {
    let ctx = AppContext::new(options, Route::Login)?;
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let registration = Registration::new(username, email, password).with_clearance(clearance);
    let account = ctx.auth().register(&registration).await?;
    println!(
        "✅ Registered {} <{}> (clearance {}). Sign in with `suraksh login {}`.",
        account.username, account.email, account.clearance_level, account.username
    );
    Ok(())
}

pub fn logout(options: &ContextOptions) -> Result<()> {
    let ctx = AppContext::new(options, Route::Login)?;
    let was_signed_in = ctx.session.is_authenticated();
    ctx.auth().logout()?;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(options: &ContextOptions) -> Result<()> {
    let ctx = AppContext::new(options, Route::Dashboard)?;
    ctx.require_session().await?;

    match ctx.auth().current_profile().await? {
        Some(profile) => {
            println!("Username:  {}", profile.username);
            println!("Email:     {}", profile.email);
            println!("Clearance: {}", profile.clearance_level);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

pub async fn health(options: &ContextOptions) -> Result<()> {
    let ctx = AppContext::new(options, Route::Dashboard)?;
    let status = ctx.api.health().await?;
    println!(
        "{} is {} ({})",
        status.service.as_deref().unwrap_or("backend"),
        status.status,
        ctx.config.api_base_url
    );
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
