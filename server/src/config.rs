use anyhow::{Context, Result, anyhow};

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.test";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
    pub cors_allowed_origins: Vec<String>,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET missing")?;
        if jwt_secret.trim().len() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let session_ttl_minutes = match std::env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| anyhow!("invalid SESSION_TTL_MINUTES: {raw}"))?,
            Err(_) => 480,
        };

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let admin_email = std::env::var("ADMIN_EMAIL")
            .ok()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|password| !password.is_empty());

        let seed_demo = std::env::var("SEED_DEMO")
            .ok()
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            jwt_secret,
            session_ttl_minutes,
            cors_allowed_origins,
            admin_email,
            admin_password,
            seed_demo,
        })
    }
}
