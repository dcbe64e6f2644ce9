use crate::{
    api,
    registration::Registrar,
    store::{SqliteStore, UserStore},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let store = SqliteStore::connect(&args.dsn)
        .await
        .with_context(|| format!("Failed to open database: {}", args.dsn))?;

    info!("Connected to database, users table ready");

    let store: Arc<dyn UserStore> = Arc::new(store);

    api::new(args.port, Registrar::new(store)).await
}
