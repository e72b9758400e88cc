use std::sync::Arc;

use docbuilder_db::DbPool;

use crate::config::ServerConfig;

/// Handed to every handler through `State<AppState>`. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
}
