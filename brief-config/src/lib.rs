//! Loader for Brief configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional YAML file (`brief.yaml`), inline
//! YAML snippets, then `BRIEF__`-prefixed environment variables where `__`
//! separates nesting levels (`BRIEF__SUMMARIZER__PROVIDER=openai`). String
//! values may reference other variables as `${VAR}`; expansion is recursive up
//! to a fixed depth. Every field has a default, so an empty source set yields a
//! working configuration.
use brief_common::SummarizerConfig;
use brief_common::observability::{LogConfig, LogFormat};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Browser-like agent; several news sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";
pub const DEFAULT_HACKER_NEWS_URL: &str = "https://news.ycombinator.com/";

#[derive(Debug, thiserror::Error)]
pub enum BriefConfigError {
    #[error(transparent)]
    Load(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BriefConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub summarizer: SummarizerConfig,
    pub headlines: HeadlinesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".into(),
        }
    }
}

/// Article download settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Pages whose extracted text is shorter than this are not treated as articles.
    pub min_article_chars: usize,
    pub retries: usize,
    pub article_ttl_secs: u64,
    /// Bound on cached articles, summaries and per-link outcomes.
    pub max_cached_links: usize,
    /// Larger pages are abandoned mid-download.
    pub max_page_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.into(),
            min_article_chars: 200,
            retries: 1,
            article_ttl_secs: 3600,
            max_cached_links: 1024,
            max_page_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeadlinesConfig {
    pub hacker_news_url: String,
    pub ttl_secs: u64,
    pub default_count: usize,
}

impl Default for HeadlinesConfig {
    fn default() -> Self {
        Self {
            hacker_news_url: DEFAULT_HACKER_NEWS_URL.into(),
            ttl_secs: 3600,
            default_count: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

impl BriefConfig {
    /// Reject combinations that would only fail later at request time.
    pub fn validate(&self) -> Result<(), BriefConfigError> {
        self.server.bind.parse::<SocketAddr>().map_err(|e| {
            BriefConfigError::Invalid(format!("server.bind `{}`: {e}", self.server.bind))
        })?;
        let s = &self.summarizer;
        if s.min_length > s.max_length {
            return Err(BriefConfigError::Invalid(format!(
                "summarizer.min_length ({}) exceeds max_length ({})",
                s.min_length, s.max_length
            )));
        }
        if s.max_input_chars == 0 {
            return Err(BriefConfigError::Invalid(
                "summarizer.max_input_chars must be positive".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(BriefConfigError::Invalid(
                "fetch.timeout_secs must be positive".into(),
            ));
        }
        if self.fetch.max_cached_links == 0 || self.fetch.max_page_bytes == 0 {
            return Err(BriefConfigError::Invalid(
                "fetch.max_cached_links and fetch.max_page_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct BriefConfigLoader {
    files: Vec<(PathBuf, bool)>,
    snippets: Vec<String>,
    env_prefix: String,
}

impl Default for BriefConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BriefConfigLoader {
    /// Start with defaults plus `BRIEF__` env overrides.
    ///
    /// ```
    /// use brief_config::BriefConfigLoader;
    ///
    /// let config = BriefConfigLoader::new()
    ///     .with_yaml_str("server:\n  bind: 0.0.0.0:9000")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.bind, "0.0.0.0:9000");
    /// assert_eq!(config.fetch.min_article_chars, 200);
    /// ```
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            snippets: Vec::new(),
            env_prefix: "BRIEF".into(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a file that is silently skipped when missing, so deployments can
    /// rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.snippets.push(yaml.to_string());
        self
    }

    /// Use a different env prefix; tests use this to avoid cross-talk.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and validate.
    ///
    /// ```
    /// use brief_common::Provider;
    /// use brief_config::BriefConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_HF_TOKEN", "hf_from_env"); }
    ///
    /// let config = BriefConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// summarizer:
    ///   provider: huggingface
    ///   auth_token: "${DOC_HF_TOKEN}"
    ///   max_length: 90
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.summarizer.provider, Provider::HuggingFace);
    /// assert_eq!(config.summarizer.auth_token(), Some("hf_from_env"));
    /// assert_eq!(config.summarizer.max_length, 90);
    ///
    /// unsafe { std::env::remove_var("DOC_HF_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<BriefConfig, BriefConfigError> {
        let mut builder = Config::builder();
        for (path, required) in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }
        for yaml in &self.snippets {
            builder = builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BriefConfig = serde_json::from_value(v)
            .map_err(|e| BriefConfigError::Load(ConfigError::Message(e.to_string())))?;
        typed.validate()?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${STATE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_validate() {
        BriefConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_lengths() {
        let mut cfg = BriefConfig::default();
        cfg.summarizer.min_length = 200;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("min_length"));
    }

    #[test]
    fn rejects_bad_bind() {
        let mut cfg = BriefConfig::default();
        cfg.server.bind = "localhost".into();
        assert!(matches!(cfg.validate(), Err(BriefConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unbounded_fetch_limits() {
        let mut cfg = BriefConfig::default();
        cfg.fetch.max_cached_links = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_cached_links"));
    }

    #[test]
    fn logging_section_maps_to_log_config() {
        let logging = LoggingConfig {
            filter: "debug".into(),
            format: LogFormat::Json,
            ..Default::default()
        };
        let lc = logging.to_log_config();
        assert_eq!(lc.default_filter, "debug");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.app_name, "brief");
    }
}
