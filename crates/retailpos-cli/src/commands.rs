//! Subcommand handlers.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use retailpos_core::auth::AuthError;
use retailpos_core::models::{Product, RegisterRequest};
use retailpos_core::{ApiError, Claims, Config, Session};
use tracing::warn;

use crate::format::{format_price, format_timestamp, truncate_string};

/// Shown whenever a command needs a logged in user
const LOGIN_HINT: &str = "Not logged in. Run `retailpos login` first.";

/// Column width for product names in the listing
const PRODUCT_NAME_WIDTH: usize = 28;

/// Column width for categories in the listing
const CATEGORY_WIDTH: usize = 14;

pub async fn login(session: &Session, config: &mut Config, username: Option<String>) -> Result<ExitCode> {
    let username = match username {
        Some(username) => username,
        None => prompt_username(config.last_username.as_deref())?,
    };
    if username.is_empty() {
        anyhow::bail!("Username required");
    }
    let password = rpassword::prompt_password("Password: ")?;

    match session.login(&username, &password).await {
        Ok(response) => {
            config.last_username = Some(username.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }

            let name = response
                .user
                .as_ref()
                .and_then(|u| u.name.clone())
                .unwrap_or(username);
            println!("Logged in as {}", name);
            Ok(ExitCode::SUCCESS)
        }
        Err(AuthError::Api(ApiError::Unauthorized(message))) | Err(AuthError::LoginRejected(message)) => {
            eprintln!("Login failed: {}", message);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("Login failed"),
    }
}

pub async fn register(
    session: &Session,
    name: String,
    username: String,
    email: String,
    role: String,
) -> Result<ExitCode> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        eprintln!("Passwords do not match");
        return Ok(ExitCode::FAILURE);
    }

    let request = RegisterRequest {
        name,
        username,
        email,
        password,
        role,
    };

    match session.register(&request).await {
        Ok(response) => {
            match response.employee_id {
                Some(id) => println!("Registered {} as {}", request.username, id),
                None => println!("Registered {}", request.username),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(AuthError::Api(ApiError::BadRequest(message))) => {
            eprintln!("Registration failed: {}", message);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("Registration failed"),
    }
}

pub fn logout(session: &Session) -> Result<ExitCode> {
    session.logout().context("Failed to clear stored token")?;
    println!("Logged out");
    Ok(ExitCode::SUCCESS)
}

pub fn status(session: &Session) -> ExitCode {
    if session.tokens().is_authenticated() {
        println!("authenticated");
        ExitCode::SUCCESS
    } else {
        println!("anonymous");
        ExitCode::FAILURE
    }
}

pub fn whoami(session: &Session) -> Result<ExitCode> {
    if session.tokens().ensure_authenticated().is_err() {
        eprintln!("{}", LOGIN_HINT);
        return Ok(ExitCode::FAILURE);
    }

    let Some(claims) = session.current_user() else {
        eprintln!("Stored token has no readable claims. Run `retailpos login` again.");
        return Ok(ExitCode::FAILURE);
    };

    print!("{}", describe_claims(&claims)?);
    Ok(ExitCode::SUCCESS)
}

pub async fn products(session: &Session) -> Result<ExitCode> {
    match session.products().await {
        Ok(products) => {
            print!("{}", product_table(&products));
            Ok(ExitCode::SUCCESS)
        }
        Err(ApiError::Unauthorized(message)) => {
            eprintln!("{}", unauthorized_message(session.tokens().is_authenticated(), &message));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("Failed to fetch products"),
    }
}

/// Explain a 401: either nobody is logged in or the stored token was refused
fn unauthorized_message(authenticated: bool, server_message: &str) -> String {
    if authenticated {
        format!(
            "Stored token was rejected ({}). Run `retailpos login` again.",
            server_message
        )
    } else {
        format!("{} ({})", LOGIN_HINT, server_message)
    }
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_username {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

fn describe_claims(claims: &Claims) -> Result<String> {
    let mut out = String::new();
    if let Some(name) = claims.display_name() {
        out.push_str(&format!("User:    {}\n", name));
    }
    if let Some(role) = claims.role() {
        out.push_str(&format!("Role:    {}\n", role));
    }
    if let Some(iat) = claims.issued_at() {
        out.push_str(&format!("Issued:  {}\n", format_timestamp(iat)));
    }
    if let Some(exp) = claims.expires_at() {
        out.push_str(&format!("Expires: {}\n", format_timestamp(exp)));
    }
    out.push_str(&serde_json::to_string_pretty(claims)?);
    out.push('\n');
    Ok(out)
}

fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products\n".to_string();
    }

    let mut out = format!(
        "{:<10} {:<name_w$} {:<cat_w$} {:>14} {:>6}\n",
        "ID",
        "NAME",
        "CATEGORY",
        "PRICE",
        "STOCK",
        name_w = PRODUCT_NAME_WIDTH,
        cat_w = CATEGORY_WIDTH,
    );
    for product in products {
        out.push_str(&format!(
            "{:<10} {:<name_w$} {:<cat_w$} {:>14} {:>6}\n",
            product.product_id.as_deref().unwrap_or("-"),
            truncate_string(&product.name, PRODUCT_NAME_WIDTH),
            truncate_string(product.category_display(), CATEGORY_WIDTH),
            product.price.map(format_price).unwrap_or_else(|| "-".to_string()),
            product.stock.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            name_w = PRODUCT_NAME_WIDTH,
            cat_w = CATEGORY_WIDTH,
        ));
    }
    out
}
