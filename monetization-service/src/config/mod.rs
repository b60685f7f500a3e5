use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

/// Identity-token verification settings.
///
/// Tokens are issued by the external identity provider. Production deployments
/// verify against the provider's RSA public key; an HMAC shared secret can be
/// configured instead. Exactly one must be set, or startup fails.
#[derive(Deserialize, Clone, Debug)]
pub struct AuthConfig {
    pub public_key_path: Option<String>,
    pub hmac_secret: Option<Secret<String>>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("MONETIZATION_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("MONETIZATION_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;

        let db_url =
            env::var("MONETIZATION_DATABASE_URL").expect("MONETIZATION_DATABASE_URL must be set");
        let db_name = env::var("MONETIZATION_DATABASE_NAME")
            .unwrap_or_else(|_| "monetization_db".to_string());

        let public_key_path = env::var("AUTH_JWT_PUBLIC_KEY_PATH").ok();
        let hmac_secret = env::var("AUTH_JWT_SECRET").ok().map(Secret::new);

        let razorpay_key_id = env::var("RAZORPAY_KEY_ID").unwrap_or_default();
        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET").unwrap_or_default();
        let razorpay_api_base_url = env::var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            auth: AuthConfig {
                public_key_path,
                hmac_secret,
            },
            razorpay: RazorpayConfig {
                key_id: razorpay_key_id,
                key_secret: Secret::new(razorpay_key_secret),
                api_base_url: razorpay_api_base_url,
            },
            service_name: "monetization-service".to_string(),
        })
    }
}
