//! RemitDesk - Money-Remittance Back-Office
//!
//! Entry point: load config, init logging, connect PostgreSQL, ensure the
//! schema, start the HTTP gateway.

use std::sync::Arc;

use remitdesk::config::AppConfig;
use remitdesk::db::Database;
use remitdesk::gateway;
use remitdesk::logging::init_logging;
use remitdesk::schema::init_schema;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Config (config/{env}.yaml)
    let env = get_env();
    let config = AppConfig::load(&env);

    // 2. Logging (guard must live for the whole process)
    let _guard = init_logging(&config);
    tracing::info!(env, "RemitDesk starting");

    // 3. PostgreSQL
    let db = Arc::new(Database::connect(&config.postgres_url).await?);
    db.health_check().await?;
    tracing::info!("PostgreSQL connected");

    // 4. Schema (idempotent)
    init_schema(db.pool()).await?;

    // 5. Gateway (blocks until shutdown)
    gateway::run_server(&config, db).await?;

    Ok(())
}
