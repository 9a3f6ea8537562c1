use std::env;
use std::time::Duration;

use medadmin_application::CreatePolicy;
use medadmin_core::{AppError, SessionRole};
use medadmin_domain::RecordKey;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base_url: Option<Url>,
    pub api_token: Option<String>,
    pub user: String,
    pub role: SessionRole,
    pub http_timeout: Duration,
    pub doctor_hospital_id: Option<RecordKey>,
    pub create_policy: CreatePolicy,
    pub offline: bool,
}

impl DashboardConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let offline = optional("DASHBOARD_OFFLINE")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

        let api_base_url = match optional("API_BASE_URL") {
            Some(value) => Some(Url::parse(value.trim()).map_err(|error| {
                AppError::Validation(format!("invalid API_BASE_URL '{value}': {error}"))
            })?),
            None if offline => None,
            None => return Err(AppError::Validation("API_BASE_URL is required".to_owned())),
        };

        let role = optional("DASHBOARD_ROLE")
            .unwrap_or_else(|| "admin".to_owned())
            .trim()
            .to_ascii_lowercase()
            .parse::<SessionRole>()?;

        let http_timeout_seconds = match optional("HTTP_TIMEOUT_SECONDS") {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid HTTP_TIMEOUT_SECONDS: {error}"))
            })?,
            None => 15,
        };

        let doctor_hospital_id = optional("DOCTOR_HOSPITAL_ID").map(|value| {
            let value = value.trim();
            value
                .parse::<i64>()
                .map_or_else(|_| RecordKey::from(value), RecordKey::Number)
        });

        let create_policy = match optional("CREATE_POLICY")
            .unwrap_or_else(|| "refetch".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "refetch" => CreatePolicy::Refetch,
            "append" => CreatePolicy::Append,
            "manual" => CreatePolicy::Manual,
            other => {
                return Err(AppError::Validation(format!(
                    "CREATE_POLICY must be 'refetch', 'append' or 'manual', got '{other}'"
                )));
            }
        };

        Ok(Self {
            api_base_url,
            api_token: optional("API_TOKEN"),
            user: optional("DASHBOARD_USER").unwrap_or_else(|| "admin".to_owned()),
            role,
            http_timeout: Duration::from_secs(http_timeout_seconds.max(1)),
            doctor_hospital_id,
            create_policy,
            offline,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use medadmin_application::CreatePolicy;
    use medadmin_core::{AppError, SessionRole};
    use medadmin_domain::RecordKey;

    use super::DashboardConfig;

    fn load(pairs: &[(&str, &str)]) -> Result<DashboardConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        DashboardConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_base_url_is_set() {
        let config = load(&[("API_BASE_URL", "https://api.example.test/admin")])
            .unwrap_or_else(|error| panic!("config: {error}"));

        assert_eq!(config.user, "admin");
        assert_eq!(config.role, SessionRole::Admin);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.create_policy, CreatePolicy::Refetch);
        assert_eq!(config.api_token, None);
        assert!(!config.offline);
    }

    #[test]
    fn base_url_is_required_unless_offline() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));

        let offline = load(&[("DASHBOARD_OFFLINE", "true")])
            .unwrap_or_else(|error| panic!("config: {error}"));
        assert!(offline.offline);
        assert_eq!(offline.api_base_url, None);
    }

    #[test]
    fn rejects_malformed_values() {
        let base = ("API_BASE_URL", "https://api.example.test");
        assert!(load(&[("API_BASE_URL", "not a url")]).is_err());
        assert!(load(&[base, ("CREATE_POLICY", "sometimes")]).is_err());
        assert!(load(&[base, ("HTTP_TIMEOUT_SECONDS", "soon")]).is_err());
        assert!(load(&[base, ("DASHBOARD_ROLE", "root")]).is_err());
    }

    #[test]
    fn parses_scope_and_policy() {
        let config = load(&[
            ("API_BASE_URL", "https://api.example.test"),
            ("DOCTOR_HOSPITAL_ID", "12"),
            ("CREATE_POLICY", "Append"),
            ("DASHBOARD_ROLE", "viewer"),
        ])
        .unwrap_or_else(|error| panic!("config: {error}"));

        assert_eq!(config.doctor_hospital_id, Some(RecordKey::Number(12)));
        assert_eq!(config.create_policy, CreatePolicy::Append);
        assert_eq!(config.role, SessionRole::Viewer);
    }
}
