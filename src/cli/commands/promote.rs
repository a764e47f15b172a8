use serde_json::json;

use crate::access::Role;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::{DatabaseManager, PgStore, UserStore};

/// Registration never hands out staff roles, so the first admin is made here.
pub async fn handle(email: &str, role: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = role.parse()?;

    let pool = DatabaseManager::connect(config()).await?;
    let store = PgStore::new(pool);

    let user = store.get_by_email(email).await?;
    store.update_role(user.id, role).await?;
    tracing::info!(user_id = user.id, role = %role, "role changed from the command line");

    output_success(
        output_format,
        &format!("{} is now {}", email, role),
        Some(json!({ "user_id": user.id, "role": role })),
    )
}
