use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Usually supplied through `KEPCO_SERVICE_KEY` rather than the file.
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Offset used to decide what "yesterday" is.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    /// Usually supplied through `SMTP_PASSWORD` rather than the file.
    #[serde(default)]
    pub password: String,
    pub from: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    pub report: Option<ReportConfig>,
    pub mail: Option<MailConfig>,
    pub metrics: Option<MetricsConfig>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_utc_offset_hours() -> i8 {
    9
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_smtp_port() -> u16 {
    587
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("POWER_SAVING_CONFIG")
            .unwrap_or_else(|_| "power-saving.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let mut cfg = Self::from_toml(&contents)?;
        cfg.apply_secret_overrides(|name| env::var(name).ok());
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Environment values win over whatever the file holds.
    fn apply_secret_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("KEPCO_SERVICE_KEY").filter(|v| !v.trim().is_empty()) {
            self.upstream.service_key = key;
        }
        if let Some(mail) = self.mail.as_mut() {
            if let Some(password) = lookup("SMTP_PASSWORD").filter(|v| !v.trim().is_empty()) {
                mail.password = password;
            }
        }
    }

    pub fn report_output_dir(&self) -> PathBuf {
        self.report
            .as_ref()
            .map(|r| r.output_dir.clone())
            .unwrap_or_else(default_output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        bind_addr = "0.0.0.0:8000"

        [upstream]
        base_url = "https://opm.kepco.co.kr:11080/OpenAPI"

        [directory]
        path = "kepcolist_gg.csv"

        [mail]
        smtp_host = "smtp.gmail.com"
        username = "reports@example.com"
        from = "reports@example.com"
        recipients = ["a@example.com", "b@example.com"]
    "#;

    #[test]
    fn minimal_file_gets_defaults() {
        let cfg = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.upstream.timeout_secs, 30);
        assert_eq!(cfg.clock.utc_offset_hours, 9);
        assert_eq!(cfg.report_output_dir(), PathBuf::from("."));
        let mail = cfg.mail.as_ref().unwrap();
        assert_eq!(mail.smtp_port, 587);
        assert_eq!(mail.recipients.len(), 2);
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn secrets_come_from_the_environment() {
        let mut cfg = AppConfig::from_toml(MINIMAL).unwrap();
        cfg.apply_secret_overrides(|name| match name {
            "KEPCO_SERVICE_KEY" => Some("svc-key".to_string()),
            "SMTP_PASSWORD" => Some("app-password".to_string()),
            _ => None,
        });
        assert_eq!(cfg.upstream.service_key, "svc-key");
        assert_eq!(cfg.mail.unwrap().password, "app-password");
    }

    #[test]
    fn blank_environment_values_do_not_clobber_the_file() {
        let mut cfg = AppConfig::from_toml(&MINIMAL.replace(
            "base_url = \"https://opm.kepco.co.kr:11080/OpenAPI\"",
            "base_url = \"https://opm.kepco.co.kr:11080/OpenAPI\"\nservice_key = \"from-file\"",
        ))
        .unwrap();
        cfg.apply_secret_overrides(|_| Some("  ".to_string()));
        assert_eq!(cfg.upstream.service_key, "from-file");
    }
}
