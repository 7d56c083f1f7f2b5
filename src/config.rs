use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub template_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub client_url: String,
    pub upload_dir: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "snippets".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "snippets-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
            cookie_name: std::env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "jwt".into()),
            // Secure cookies everywhere except local development
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v != "false")
                .unwrap_or_else(|_| {
                    std::env::var("APP_ENV")
                        .map(|e| e == "production")
                        .unwrap_or(false)
                }),
        };
        let mail = MailConfig {
            host: std::env::var("EMAIL_HOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("EMAIL_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            username: std::env::var("EMAIL_USER").unwrap_or_default(),
            password: std::env::var("EMAIL_PASS").unwrap_or_default(),
            from_address: std::env::var("EMAIL_ADDRESS")
                .unwrap_or_else(|_| "no-reply@snippets.local".into()),
            template_dir: std::env::var("EMAIL_TEMPLATE_DIR").unwrap_or_else(|_| "emails".into()),
        };
        Ok(Self {
            database_url,
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            jwt,
            mail,
        })
    }
}
