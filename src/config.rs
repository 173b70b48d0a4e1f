use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Production API root.
pub const DEFAULT_URL: &str = "https://api.petfinder.com/v2";

/// OAuth2 client credentials issued by Petfinder (API key and secret).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, typically `https://api.petfinder.com/v2`.
    pub url: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Config pointing at the production API.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            credentials,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Resolves configuration from `PETFINDER_URL` / `PETFINDER_KEY` /
    /// `PETFINDER_SECRET`, falling back to a `.petfinderrc` file.
    pub fn from_env() -> Result<Self> {
        load_config(None, None, None)
    }
}

#[derive(Debug, Default)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
}

pub(crate) fn load_config(
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
) -> Result<ClientConfig> {
    load_config_with(url, key, secret, |name| std::env::var(name).ok())
}

/// Same as [`load_config`], reading variables through `var` instead of the
/// process environment.
pub(crate) fn load_config_with<F>(
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
    var: F,
) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut url = url.or_else(|| var("PETFINDER_URL"));
    let mut key = key.or_else(|| var("PETFINDER_KEY"));
    let mut secret = secret.or_else(|| var("PETFINDER_SECRET"));

    let rc_candidates = rc_candidates(&var);

    if url.is_none() || key.is_none() || secret.is_none() {
        for rc_path in &rc_candidates {
            if rc_path.exists() {
                let cfg = read_rc(rc_path).with_context(|| {
                    format!("failed to read configuration file {}", rc_path.display())
                })?;

                url = url.or(cfg.url);
                key = key.or(cfg.key);
                secret = secret.or(cfg.secret);
                break;
            }
        }
    }

    let key = key.ok_or_else(|| missing("key", "PETFINDER_KEY", &rc_candidates))?;
    let secret = secret.ok_or_else(|| missing("secret", "PETFINDER_SECRET", &rc_candidates))?;
    let url = url.unwrap_or_else(|| DEFAULT_URL.to_string());

    Ok(ClientConfig {
        url,
        credentials: Credentials::new(key, secret),
    })
}

fn missing(field: &'static str, env: &str, rc_candidates: &[PathBuf]) -> Error {
    let hint = if rc_candidates.is_empty() {
        format!("set {} or create .petfinderrc", env)
    } else {
        format!(
            "set {} or put `{}:` in one of: {}",
            env,
            field,
            rc_candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    Error::MissingConfig { field, hint }
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `key:` may be followed by its value on the next line.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') {
                cfg.set(pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if !matches!(k, "url" | "key" | "secret") {
                continue;
            }
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

impl RcConfig {
    fn set(&mut self, field: &str, value: &str) {
        let value = Some(value.to_string());
        match field {
            "url" => self.url = value,
            "key" => self.key = value,
            "secret" => self.secret = value,
            _ => {}
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates<F>(var: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    // 1) PETFINDER_RC (explicit)
    // 2) ./.petfinderrc
    // 3) ~/.petfinderrc
    if let Some(p) = var("PETFINDER_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".petfinderrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".petfinderrc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn no_rc_file(dir: &tempfile::TempDir) -> String {
        dir.path().join("absent").display().to_string()
    }

    #[test]
    fn env_supplies_both_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let rc = no_rc_file(&dir);
        let cfg = load_config_with(
            None,
            None,
            None,
            lookup(&[
                ("PETFINDER_KEY", "key"),
                ("PETFINDER_SECRET", "secret"),
                ("PETFINDER_RC", rc.as_str()),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.url, DEFAULT_URL);
        assert_eq!(cfg.credentials, Credentials::new("key", "secret"));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let rc = no_rc_file(&dir);
        let err = load_config_with(
            None,
            None,
            None,
            lookup(&[("PETFINDER_SECRET", "secret"), ("PETFINDER_RC", rc.as_str())]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingConfig { field: "key", .. })
        ));
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let rc = no_rc_file(&dir);
        let err = load_config_with(
            None,
            None,
            None,
            lookup(&[("PETFINDER_KEY", "key"), ("PETFINDER_RC", rc.as_str())]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingConfig { field: "secret", .. })
        ));
        assert!(err.to_string().contains("PETFINDER_SECRET"));
    }

    #[test]
    fn explicit_arguments_beat_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".petfinderrc");
        std::fs::write(&rc, "url: http://from-file\nkey: file-key\nsecret: file-secret\n").unwrap();
        let rc = rc.display().to_string();

        let cfg = load_config_with(
            None,
            Some("arg-key".to_string()),
            None,
            lookup(&[("PETFINDER_SECRET", "env-secret"), ("PETFINDER_RC", rc.as_str())]),
        )
        .unwrap();
        assert_eq!(cfg.url, "http://from-file");
        assert_eq!(cfg.credentials, Credentials::new("arg-key", "env-secret"));
    }

    #[test]
    fn rc_file_parsing() {
        let cfg = parse_rc(
            "# petfinder\nurl: 'http://localhost:8080/v2'\nkey:\n  \"abc\"\nverify: 0\nsecret: s3cr:et\n",
        );
        assert_eq!(cfg.url.as_deref(), Some("http://localhost:8080/v2"));
        assert_eq!(cfg.key.as_deref(), Some("abc"));
        assert_eq!(cfg.secret.as_deref(), Some("s3cr:et"));
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("id", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("id"));
        assert!(!shown.contains("hunter2"));
    }
}
