use serde_json::json;

use crate::access::Role;
use crate::auth::{Identity, TokenCodec};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

/// Signs a token with the configured secret; nothing is checked against the store.
pub fn handle(user_id: i64, role: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = role.parse()?;
    let config = config();

    let secret = config.jwt_secret()?;
    let token = TokenCodec::new(secret.as_bytes(), config.token_ttl()?)?.issue(&Identity::new(user_id, role))?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "expires_in_hours": config.security.jwt_expiry_hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
