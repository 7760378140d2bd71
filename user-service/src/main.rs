use std::sync::Arc;

use user_service::database::create_pool;
use user_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let store: Arc<dyn UserStore> = match &config.database {
        Some(database) => {
            let store = PgUserStore::new(create_pool(database).await?);
            store.ensure_schema().await?;
            tracing::info!("Using PostgreSQL user store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("No database configured, using in-memory user store");
            Arc::new(MemoryUserStore::new())
        }
    };

    let app = router(AppState::new(config.clone(), store));
    Server::new(config).serve(app).await
}
