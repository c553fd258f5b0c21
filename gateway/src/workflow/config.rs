use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use viewpointcore::generation::{GeminiSettings, DEFAULT_MODEL};

const DEFAULT_BIND: &str = "127.0.0.1:9000";
const DEFAULT_STYLE: &str = "osm-standard";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub model: String,
    pub api_base: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Map style recorded for offline runs.
    pub style: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let settings = GeminiSettings::default();
        Self {
            bind: DEFAULT_BIND.into(),
            model: DEFAULT_MODEL.into(),
            api_base: settings.api_base,
            api_key: None,
            style: DEFAULT_STYLE.into(),
        }
    }
}

impl GatewayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading gateway config {}", path_ref.display()))?;
        let config: GatewayConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing gateway config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Applies `GEMINI_*` environment variables on top of file or default values.
    pub fn with_env_overrides(self) -> Self {
        let settings = self.to_settings().with_env_overrides();
        Self {
            api_key: settings.api_key,
            model: settings.model,
            api_base: settings.api_base,
            ..self
        }
    }

    /// Applies command-line values, which take precedence over everything else.
    pub fn with_args(self, bind: Option<String>, model: Option<String>) -> Self {
        Self {
            bind: bind.unwrap_or(self.bind),
            model: model.unwrap_or(self.model),
            ..self
        }
    }

    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid bind address {}", self.bind))
    }

    pub fn to_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn args_override_defaults() {
        let cfg = GatewayConfig::default().with_args(None, Some("other-model".into()));
        assert_eq!(cfg.bind, "127.0.0.1:9000");
        assert_eq!(cfg.model, "other-model");
        assert_eq!(cfg.bind_address().unwrap().port(), 9000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"bind: 0.0.0.0:8088\nmodel: image-model\nstyle: satellite\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = GatewayConfig::load(&path).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8088");
        assert_eq!(cfg.model, "image-model");
        assert_eq!(cfg.style, "satellite");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn api_key_is_never_written_back() {
        let cfg = GatewayConfig {
            api_key: Some("secret".into()),
            ..GatewayConfig::default()
        };
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn bad_bind_address_is_reported() {
        let cfg = GatewayConfig::default().with_args(Some("not-an-address".into()), None);
        assert!(cfg.bind_address().is_err());
    }

    #[test]
    fn model_flag_beats_environment() {
        std::env::set_var("GEMINI_IMAGE_MODEL", "env-model");
        let from_env = GatewayConfig::default().with_env_overrides();
        let flagged = from_env.clone().with_args(None, Some("flag-model".into()));
        std::env::remove_var("GEMINI_IMAGE_MODEL");

        assert_eq!(from_env.model, "env-model");
        assert_eq!(flagged.model, "flag-model");
        assert_eq!(flagged.to_settings().model, "flag-model");
        assert_eq!(
            from_env.with_args(None, None).to_settings().model,
            "env-model"
        );
    }
}
