use anyhow::{anyhow, Context};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub auth: AuthSettings,
    pub email: EmailConfig,
    pub renderer: RendererConfig,
    pub media_root: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_hours: i64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[REDACTED]")
            .field("session_hours", &self.session_hours)
            .finish()
    }
}

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RendererConfig {
    /// Explicit `wkhtmltopdf` location; ignored when the path does not exist.
    pub wkhtmltopdf_cmd: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL is not set"))?;

        let host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match get("SERVER_PORT") {
            Some(p) => p.parse().with_context(|| format!("Invalid SERVER_PORT: {p}"))?,
            None => 8000,
        };
        let base_url = get("BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, generating an ephemeral secret; sessions will not survive a restart");
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        });
        let session_hours: i64 = match get("SESSION_HOURS") {
            Some(h) => h.parse().with_context(|| format!("Invalid SESSION_HOURS: {h}"))?,
            None => 24,
        };

        let smtp_port: u16 = match get("SMTP_PORT") {
            Some(p) => p.parse().with_context(|| format!("Invalid SMTP_PORT: {p}"))?,
            None => 587,
        };

        Ok(AppConfig {
            database_url,
            server: ServerConfig {
                host,
                port,
                base_url,
            },
            auth: AuthSettings {
                jwt_secret,
                session_hours,
            },
            email: EmailConfig {
                smtp_host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                smtp_port,
                username: get("SMTP_USER"),
                password: get("SMTP_PASS"),
                from: get("SMTP_FROM").unwrap_or_else(|| "noreply@localhost".to_string()),
            },
            renderer: RendererConfig {
                wkhtmltopdf_cmd: get("WKHTMLTOPDF_CMD").map(PathBuf::from),
            },
            media_root: get("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./media")),
        })
    }

    /// Directory where emailed invoice PDFs are persisted.
    pub fn invoice_pdf_dir(&self) -> PathBuf {
        self.media_root.join("client_invoices")
    }
}
