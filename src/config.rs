use std::fs;
use std::path::Path;

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/remote.json";

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub ws_url: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            ws_url: None,
        }
    }
}

impl RemoteConfig {
    /// URL websocket đầy đủ cho kênh realtime, suy ra từ `base_url`
    /// khi `ws_url` không được đặt riêng.
    pub fn websocket_url(&self) -> String {
        let endpoint = match &self.ws_url {
            Some(url) => {
                let trimmed = url.trim_end_matches('/');
                // URL không có path sẽ cho ra request line handshake
                // không hợp lệ (`GET ?apikey=...`).
                let has_path = trimmed
                    .splitn(2, "://")
                    .nth(1)
                    .is_some_and(|rest| rest.contains('/'));
                if has_path {
                    trimmed.to_string()
                } else {
                    format!("{trimmed}/realtime/v1/websocket")
                }
            }
            None => {
                let base = self.base_url.trim_end_matches('/');
                let swapped = if let Some(rest) = base.strip_prefix("https://") {
                    format!("wss://{rest}")
                } else if let Some(rest) = base.strip_prefix("http://") {
                    format!("ws://{rest}")
                } else {
                    format!("wss://{base}")
                };
                format!("{swapped}/realtime/v1/websocket")
            }
        };
        format!("{endpoint}?apikey={}&vsn=1.0.0", self.api_key)
    }
}

pub fn load_config(path: &str) -> RemoteConfig {
    let mut config = read_config_file(Path::new(path));

    if let Ok(url) = std::env::var("SUPABASE_URL") {
        config.base_url = url;
    }
    if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
        config.api_key = key;
    }
    if let Ok(url) = std::env::var("SUPABASE_REALTIME_URL") {
        config.ws_url = Some(url);
    }

    if config.base_url.is_empty() || config.api_key.is_empty() {
        log::warn!(
            "Remote store is not configured; set SUPABASE_URL and SUPABASE_ANON_KEY or edit {path}"
        );
    }
    config
}

fn read_config_file(path: &Path) -> RemoteConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<RemoteConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                RemoteConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            RemoteConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn websocket_url_derived_from_https_base() {
        let config = RemoteConfig {
            base_url: "https://demo.supabase.co".to_string(),
            api_key: "anon".to_string(),
            ws_url: None,
        };
        assert_eq!(
            config.websocket_url(),
            "wss://demo.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[test]
    fn websocket_url_derived_from_http_base_with_trailing_slash() {
        let config = RemoteConfig {
            base_url: "http://localhost:54321/".to_string(),
            api_key: "anon".to_string(),
            ws_url: None,
        };
        assert_eq!(
            config.websocket_url(),
            "ws://localhost:54321/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[test]
    fn explicit_ws_url_wins_over_derivation() {
        let config = RemoteConfig {
            base_url: "https://demo.supabase.co".to_string(),
            api_key: "anon".to_string(),
            ws_url: Some("wss://edge.example.net/realtime/v1/websocket/".to_string()),
        };
        assert_eq!(
            config.websocket_url(),
            "wss://edge.example.net/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[test]
    fn explicit_ws_url_without_path_gets_default_endpoint() {
        let config = RemoteConfig {
            base_url: String::new(),
            api_key: "anon".to_string(),
            ws_url: Some("ws://localhost:6001".to_string()),
        };
        assert_eq!(
            config.websocket_url(),
            "ws://localhost:6001/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }

    #[test]
    fn read_config_file_parses_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url": "https://demo.supabase.co", "api_key": "anon"}}"#
        )
        .unwrap();

        let config = read_config_file(file.path());
        assert_eq!(config.base_url, "https://demo.supabase.co");
        assert_eq!(config.api_key, "anon");
        assert!(config.ws_url.is_none());
    }

    #[test]
    fn read_config_file_falls_back_on_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let config = read_config_file(file.path());
        assert!(config.base_url.is_empty());
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn read_config_file_falls_back_on_missing_file() {
        let config = read_config_file(Path::new("definitely/not/a/real/config.json"));
        assert!(config.base_url.is_empty());
    }
}
