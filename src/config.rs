use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Runs the book catalog service and its terminal client", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config", global = true)]
    pub config_path: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the REST API and the embedded web UI
    Serve,
    /// Manage books through a running service
    Books {
        #[command(subcommand)]
        action: BooksCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum BooksCommand {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: Option<String>,
    },
    /// Overwrites the book with its current values patched by the given flags.
    /// Pass `--year ""` to clear the year.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    Delete {
        id: i64,
    },
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".catalog")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct App {
    host: String,
    port: u16,
    database: String,
    pub remote_url: Option<String>,
    pub auth_token: Option<String>,
    pub expose_store_errors: bool,
}

impl Default for App {
    fn default() -> Self {
        App {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: "catalog.db".to_string(),
            remote_url: None,
            auth_token: None,
            expose_store_errors: true,
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Client {
    pub base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Client {
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub app: App,
    pub cors: Cors,
    pub client: Client,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    /// Loads `path` when it exists. A missing file falls back to defaults unless
    /// the caller named it explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            tracing::info!(path = ?path, "no config file found, using defaults");
            return Ok(Config::default());
        }
        let path_str = path
            .to_str()
            .with_context(|| format!("config path {:?} is not valid utf-8", path))?;
        Config::new(path_str).with_context(|| format!("failed to load config file {:?}", path))
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        if yaml_with_env.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Resolves the database path against the data directory unless it is absolute.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let db = Path::new(self.app.get_db());
        if db.is_absolute() {
            db.to_path_buf()
        } else {
            data_dir.join(db)
        }
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find('}') {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let cfg = Config::from_yaml("").unwrap();
        assert_eq!(cfg.app.address(), "0.0.0.0:8080");
        assert_eq!(cfg.app.get_db(), "catalog.db");
        assert!(cfg.app.expose_store_errors);
        assert!(cfg.cors.allowed_origins.is_empty());
        assert_eq!(cfg.client.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
app:
  port: 9090
  expose_store_errors: false
cors:
  allowed_origins: ["http://esb.staj", "https://esb.staj"]
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.address(), "0.0.0.0:9090");
        assert!(!cfg.app.expose_store_errors);
        assert_eq!(cfg.app.get_db(), "catalog.db");
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_env_default_substitution() {
        let yaml = "app:\n  database: ${CATALOG_TEST_SURELY_UNSET_VAR:-books.db}\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_db(), "books.db");
    }

    #[test]
    fn test_database_path_resolution() {
        let cfg = Config::default();
        let dir = Path::new("/var/lib/catalog");
        assert_eq!(cfg.database_path(dir), PathBuf::from("/var/lib/catalog/catalog.db"));

        let cfg = Config::from_yaml("app:\n  database: /tmp/other.db\n").unwrap();
        assert_eq!(cfg.database_path(dir), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_missing_implicit_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(Config::load_or_default(&path, false).is_ok());
        assert!(Config::load_or_default(&path, true).is_err());
    }
}
