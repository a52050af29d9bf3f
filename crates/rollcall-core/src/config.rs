use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::DEFAULT_UTC_OFFSET_HOURS;
use crate::error::{CoreError, Result};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587; // submission port, STARTTLS
pub const DEFAULT_NOTIFICATION_TYPE: &str = "late arrival auto-notice";
pub const DEFAULT_SENT_BY: &str = "System Cron";
pub const DEFAULT_CONFIG_FILE: &str = "rollcall.toml";

/// Environment variables read without a prefix, and the config key each one fills.
const PLAIN_ENV_KEYS: [(&str, &str); 4] = [
    ("SUPABASE_URL", "backend.url"),
    ("SUPABASE_KEY", "backend.key"),
    ("SENDER_EMAIL", "mail.sender_email"),
    ("SENDER_PASSWORD", "mail.sender_password"),
];

/// Top-level config (rollcall.toml + ROLLCALL_* env overrides + the plain
/// SUPABASE_* / SENDER_* variables set by the scheduler host).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollcallConfig {
    pub backend: BackendConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub notice: NoticeConfig,
}

/// Connection to the hosted Postgres REST backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    #[serde(deserialize_with = "text")]
    pub url: String,
    /// Service or anon key, sent as both `apikey` and bearer token.
    #[serde(deserialize_with = "text")]
    pub key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Login name for the relay and the `From` address of every notice.
    #[serde(deserialize_with = "text")]
    pub sender_email: String,
    /// Relay password (for Gmail, an app password).
    #[serde(deserialize_with = "text")]
    pub sender_password: String,
    #[serde(default = "default_smtp_host", deserialize_with = "text")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

/// Labels written to the audit log and the local time zone of "today".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_notification_type", deserialize_with = "text")]
    pub notification_type: String,
    #[serde(default = "default_sent_by", deserialize_with = "text")]
    pub sent_by: String,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            notification_type: default_notification_type(),
            sent_by: default_sent_by(),
        }
    }
}

/// Env values are type-parsed, so `ROLLCALL_MAIL__SENDER_PASSWORD=1234` arrives
/// as a number. Text fields take any scalar back as its written form.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}
fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}
fn default_utc_offset_hours() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}
fn default_notification_type() -> String {
    DEFAULT_NOTIFICATION_TYPE.to_string()
}
fn default_sent_by() -> String {
    DEFAULT_SENT_BY.to_string()
}

impl RollcallConfig {
    /// Load config, later sources overriding earlier ones:
    ///   1. TOML file: explicit path, else `./rollcall.toml` (optional)
    ///   2. `ROLLCALL_*` env, `__` between sections (`ROLLCALL_MAIL__SMTP_PORT`)
    ///   3. `SUPABASE_URL`, `SUPABASE_KEY`, `SENDER_EMAIL`, `SENDER_PASSWORD`,
    ///      taken verbatim (no number or bool parsing)
    ///
    /// Fails when a required value is missing or blank.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        let mut figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ROLLCALL_").split("__"));
        for (var, target) in PLAIN_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(target, value));
            }
        }

        let config: RollcallConfig = figment
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("backend.url", &self.backend.url),
            ("backend.key", &self.backend.key),
            ("mail.sender_email", &self.mail.sender_email),
            ("mail.sender_password", &self.mail.sender_password),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }
        if self.mail.smtp_port == 0 {
            return Err(CoreError::Config("mail.smtp_port must not be 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn set_required(jail: &mut Jail) {
        jail.set_env("SUPABASE_URL", "https://demo.supabase.co");
        jail.set_env("SUPABASE_KEY", "service-key");
        jail.set_env("SENDER_EMAIL", "homeroom@school.tw");
        jail.set_env("SENDER_PASSWORD", "app-password");
    }

    #[test]
    fn plain_env_vars_fill_required_fields() {
        Jail::expect_with(|jail| {
            set_required(jail);
            let config = RollcallConfig::load(None).unwrap();
            assert_eq!(config.backend.url, "https://demo.supabase.co");
            assert_eq!(config.backend.key, "service-key");
            assert_eq!(config.mail.sender_email, "homeroom@school.tw");
            assert_eq!(config.mail.smtp_host, DEFAULT_SMTP_HOST);
            assert_eq!(config.mail.smtp_port, 587);
            assert_eq!(config.notice.utc_offset_hours, 8);
            assert_eq!(config.notice.notification_type, "late arrival auto-notice");
            assert_eq!(config.notice.sent_by, "System Cron");
            Ok(())
        });
    }

    #[test]
    fn missing_credential_fails_fast() {
        Jail::expect_with(|jail| {
            jail.set_env("SUPABASE_URL", "https://demo.supabase.co");
            jail.set_env("SUPABASE_KEY", "service-key");
            jail.set_env("SENDER_EMAIL", "homeroom@school.tw");
            let err = RollcallConfig::load(None).unwrap_err();
            assert!(matches!(err, CoreError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn blank_value_is_rejected() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("SUPABASE_KEY", "  ");
            let err = RollcallConfig::load(None).unwrap_err();
            assert!(err.to_string().contains("backend.key"));
            Ok(())
        });
    }

    #[test]
    fn numeric_and_bool_credentials_load_as_text() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("SENDER_PASSWORD", "12345678");
            jail.set_env("SUPABASE_KEY", "true");
            let config = RollcallConfig::load(None).unwrap();
            assert_eq!(config.mail.sender_password, "12345678");
            assert_eq!(config.backend.key, "true");
            Ok(())
        });
    }

    #[test]
    fn plain_env_values_keep_their_exact_spelling() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.set_env("SENDER_PASSWORD", "00123");
            jail.set_env("SUPABASE_KEY", "[key]");
            let config = RollcallConfig::load(None).unwrap();
            assert_eq!(config.mail.sender_password, "00123");
            assert_eq!(config.backend.key, "[key]");
            Ok(())
        });
    }

    #[test]
    fn numeric_prefixed_override_loads_as_text() {
        Jail::expect_with(|jail| {
            jail.set_env("SUPABASE_URL", "https://demo.supabase.co");
            jail.set_env("SUPABASE_KEY", "service-key");
            jail.set_env("SENDER_EMAIL", "homeroom@school.tw");
            jail.set_env("ROLLCALL_MAIL__SENDER_PASSWORD", "987654");
            jail.set_env("ROLLCALL_NOTICE__SENT_BY", "2026");
            let config = RollcallConfig::load(None).unwrap();
            assert_eq!(config.mail.sender_password, "987654");
            assert_eq!(config.notice.sent_by, "2026");
            Ok(())
        });
    }

    #[test]
    fn toml_file_and_prefixed_env_override_defaults() {
        Jail::expect_with(|jail| {
            set_required(jail);
            jail.create_file(
                "custom.toml",
                r#"
                [mail]
                smtp_host = "smtp.school.tw"

                [notice]
                sent_by = "Homeroom Bot"
                "#,
            )?;
            jail.set_env("ROLLCALL_MAIL__SMTP_PORT", "2525");
            let config = RollcallConfig::load(Some("custom.toml")).unwrap();
            assert_eq!(config.mail.smtp_host, "smtp.school.tw");
            assert_eq!(config.mail.smtp_port, 2525);
            assert_eq!(config.notice.sent_by, "Homeroom Bot");
            assert_eq!(config.notice.utc_offset_hours, 8);
            Ok(())
        });
    }
}
