// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_APP_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_APP_CONFIG_PATH: &str = "LEGAL_CONFIG_PATH";

const ENV_NEWS_FEEDS: &str = "NEWS_FEEDS";
const ENV_NEWS_MAX_ITEMS: &str = "NEWS_MAX_ITEMS";
const ENV_NEWS_SNIPPET_MAX_CHARS: &str = "NEWS_SNIPPET_MAX_CHARS";
const ENV_NEWS_FEED_TIMEOUT_SECS: &str = "NEWS_FEED_TIMEOUT_SECS";

pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 200;
pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "court",
    "law",
    "legal",
    "judge",
    "judgment",
    "ruling",
    "constitution",
    "legislation",
    "bill",
    "parliament",
    "attorney",
    "advocate",
    "lawsuit",
    "litigation",
    "tribunal",
    "magistrate",
    "prosecut",
    "appeal",
    "justice",
    "regulation",
];

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://www.groundup.org.za/sitenews/rss/",
    "https://www.dailymaverick.co.za/dmrss/",
    "https://feeds.news24.com/articles/news24/SouthAfrica/rss",
];

fn default_snippet_max_chars() -> usize {
    DEFAULT_SNIPPET_MAX_CHARS
}
fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}
fn default_feed_timeout_secs() -> u64 {
    DEFAULT_FEED_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    "legal-assistant/0.1 (+news aggregator)".to_string()
}
fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
}
fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewsConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            keywords: default_keywords(),
            snippet_max_chars: DEFAULT_SNIPPET_MAX_CHARS,
            max_items: DEFAULT_MAX_ITEMS,
            feed_timeout_secs: DEFAULT_FEED_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Parse TOML, then sanitize. Env overrides are not applied here.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing app config toml")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading app config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $LEGAL_CONFIG_PATH (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_APP_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_APP_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_APP_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                AppConfig::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_NEWS_FEEDS) {
            self.news.feeds = raw.split(',').map(str::to_string).collect();
        }
        if let Some(v) = parse_env::<usize>(ENV_NEWS_MAX_ITEMS) {
            self.news.max_items = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_NEWS_SNIPPET_MAX_CHARS) {
            self.news.snippet_max_chars = v;
        }
        if let Some(v) = parse_env::<u64>(ENV_NEWS_FEED_TIMEOUT_SECS) {
            self.news.feed_timeout_secs = v;
        }
    }

    fn sanitize(&mut self) {
        let n = &mut self.news;
        n.feeds = clean_list(std::mem::take(&mut n.feeds), false);
        n.keywords = clean_list(std::mem::take(&mut n.keywords), true);
        if n.snippet_max_chars == 0 || n.snippet_max_chars > 2_000 {
            n.snippet_max_chars = DEFAULT_SNIPPET_MAX_CHARS;
        }
        if n.max_items == 0 || n.max_items > 100 {
            n.max_items = DEFAULT_MAX_ITEMS;
        }
        if n.feed_timeout_secs == 0 || n.feed_timeout_secs > 120 {
            n.feed_timeout_secs = DEFAULT_FEED_TIMEOUT_SECS;
        }
        if n.user_agent.trim().is_empty() {
            n.user_agent = default_user_agent();
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Trim, drop blanks, dedupe while keeping first-seen order.
fn clean_list(items: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        let t = if lowercase { t.to_lowercase() } else { t.to_string() };
        if seen.insert(t.clone()) {
            out.push(t);
        }
    }
    out
}
