use std::path::PathBuf;

use secrecy::SecretString;
use serde_aux::field_attributes::{
    deserialize_bool_from_anything, deserialize_number_from_string,
    deserialize_option_number_from_string,
};

use crate::email_client::{DeliveryError, EmailClient, SmtpSettings};
use crate::subscriber_store::SubscriberStore;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub subscribers: SubscriberSettings,
    pub cors: CorsSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct EmailClientSettings {
    pub smtp_host: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub smtp_port: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    pub smtp_secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<SecretString>,
    pub from_email: String,
    pub admin_email: String,
}

impl EmailClientSettings {
    pub fn client(self) -> Result<EmailClient, DeliveryError> {
        let smtp = self.smtp();
        EmailClient::new(smtp, self.from_email, self.admin_email)
    }

    /// `None` means no SMTP host is configured and mail only gets logged.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.clone().filter(|h| !h.trim().is_empty())?;
        let credentials = match (&self.smtp_user, &self.smtp_pass) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Some(SmtpSettings {
            host,
            port: self.smtp_port,
            secure: self.smtp_secure,
            credentials,
        })
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SubscriberSettings {
    pub path: PathBuf,
}

impl SubscriberSettings {
    pub fn store(&self) -> SubscriberStore {
        SubscriberStore::new(self.path.clone())
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct CorsSettings {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

/// Plain environment variables the site has always been deployed with, and the keys they set.
const ENV_OVERRIDES: [(&str, &str); 8] = [
    ("PORT", "application.port"),
    ("SMTP_HOST", "email_client.smtp_host"),
    ("SMTP_PORT", "email_client.smtp_port"),
    ("SMTP_SECURE", "email_client.smtp_secure"),
    ("SMTP_USER", "email_client.smtp_user"),
    ("SMTP_PASS", "email_client.smtp_pass"),
    ("FROM_EMAIL", "email_client.from_email"),
    ("ADMIN_EMAIL", "email_client.admin_email"),
];

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine current directory");
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");

    let mut builder = config::Config::builder()
        .add_source(
            config::File::with_name(
                conf_dir
                    .join("base")
                    .to_str()
                    .expect("Failed to read base configuration"),
            )
            .required(true),
        )
        .add_source(
            config::File::with_name(
                conf_dir
                    .join(env.as_str())
                    .to_str()
                    .expect("Failed to read environment configuration"),
            )
            .required(true),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        );

    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(key, env_var(var))?;
    }

    builder.build()?.try_deserialize::<Settings>()
}
