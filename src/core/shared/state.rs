use crate::core::config::AppConfig;
use crate::pdf::RendererLocator;
use crate::shared::utils::DbPool;
use crate::web::auth::AuthConfig;

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub auth_config: AuthConfig,
    pub renderer: RendererLocator,
}

impl AppState {
    pub fn new(conn: DbPool, config: AppConfig) -> Self {
        let auth_config = AuthConfig::from_app_config(&config);
        let renderer = RendererLocator::from_config(&config.renderer);
        Self {
            conn,
            config,
            auth_config,
            renderer,
        }
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            config: self.config.clone(),
            auth_config: self.auth_config.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("conn", &"DbPool")
            .field("config", &self.config)
            .field("auth_config", &"AuthConfig")
            .field("renderer", &self.renderer)
            .finish()
    }
}
