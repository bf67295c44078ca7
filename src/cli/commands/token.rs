use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::SecurityConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a bearer token for a user id with the configured secret")]
    Mint {
        #[arg(help = "User ID to place in the token")]
        user_id: String,
        #[arg(long, help = "Hours until expiry (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub fn handle(cmd: &TokenCommands, security: &SecurityConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint { user_id, hours } => {
            if security.token_secret.is_empty() {
                anyhow::bail!("TOKEN_SECRET is not set");
            }
            let hours = hours.unwrap_or(security.jwt_expiry_hours);
            let claims = Claims::new(user_id.as_str(), hours)?;
            let token = generate_jwt(&claims, &security.token_secret)?;

            match output_format {
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token minted",
                    Some(json!({ "token": token, "userId": user_id, "exp": claims.exp })),
                ),
            }
        }
    }
}
