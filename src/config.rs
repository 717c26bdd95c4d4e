//! Configuration management for pagefs-server
//!
//! Values are resolved once at startup, in increasing priority: built-in
//! defaults, an optional `config.toml` in the working directory, then
//! `PAGEFS_` prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DRAFT_PAGES_DIR: &str = "pages";
pub const DEFAULT_PUBLISHED_PAGES_DIR: &str = "pub_pages";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK ═══
    /// IP address the listener binds to
    pub bind_address: String,

    /// Port for the command connection, 0 picks an ephemeral port
    pub port: u16,

    // ═══ STORAGE ═══
    /// Directory exposed through the object API
    pub browsable_root: String,

    /// Name of the draft pages branch under the browsable root
    pub draft_pages_dir: String,

    /// Name of the published pages branch under the browsable root
    pub published_pages_dir: String,

    /// Exclude page branches only when they sit directly under the root
    pub anchor_branch_exclusion: bool,

    // ═══ LIMITS ═══
    pub max_clients: usize,
    pub max_command_length: usize,
}

impl ServerConfig {
    /// Load configuration from defaults, `config.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PAGEFS"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration serving `root` on an ephemeral local port
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            browsable_root: root.as_ref().to_string_lossy().to_string(),
            draft_pages_dir: DEFAULT_DRAFT_PAGES_DIR.to_string(),
            published_pages_dir: DEFAULT_PUBLISHED_PAGES_DIR.to_string(),
            anchor_branch_exclusion: false,
            max_clients: 16,
            max_command_length: 64 * 1024,
        }
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 7070_i64)?
            .set_default("browsable_root", "./browsable_fs")?
            .set_default("draft_pages_dir", DEFAULT_DRAFT_PAGES_DIR)?
            .set_default("published_pages_dir", DEFAULT_PUBLISHED_PAGES_DIR)?
            .set_default("anchor_branch_exclusion", false)?
            .set_default("max_clients", 16_i64)?
            .set_default("max_command_length", 65536_i64)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.browsable_root.is_empty() {
            return Err(ConfigError::Message(
                "browsable_root cannot be empty".into(),
            ));
        }

        for (key, name) in [
            ("draft_pages_dir", &self.draft_pages_dir),
            ("published_pages_dir", &self.published_pages_dir),
        ] {
            if !is_plain_dir_name(name) {
                return Err(ConfigError::Message(format!(
                    "{key} must be a single directory name, got {name:?}"
                )));
            }
        }

        if self.draft_pages_dir == self.published_pages_dir {
            return Err(ConfigError::Message(
                "draft_pages_dir and published_pages_dir must differ".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Root paths derived from this configuration
    pub fn root_paths(&self) -> RootPaths {
        RootPaths::with_dir_names(
            &self.browsable_root,
            &self.draft_pages_dir,
            &self.published_pages_dir,
        )
    }
}

fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// The browsable root and the two page branches beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPaths {
    browsable: PathBuf,
    draft_dir_name: String,
    published_dir_name: String,
}

impl RootPaths {
    /// Roots under `browsable` using the default page branch names
    pub fn new(browsable: impl Into<PathBuf>) -> Self {
        Self::with_dir_names(
            browsable,
            DEFAULT_DRAFT_PAGES_DIR,
            DEFAULT_PUBLISHED_PAGES_DIR,
        )
    }

    pub fn with_dir_names(
        browsable: impl Into<PathBuf>,
        draft_dir_name: &str,
        published_dir_name: &str,
    ) -> Self {
        Self {
            browsable: browsable.into(),
            draft_dir_name: draft_dir_name.to_string(),
            published_dir_name: published_dir_name.to_string(),
        }
    }

    /// Create all three roots if missing and make the browsable root absolute.
    pub fn prepare(self) -> std::io::Result<Self> {
        std::fs::create_dir_all(&self.browsable)?;
        let browsable = self.browsable.canonicalize()?;
        let roots = Self { browsable, ..self };
        std::fs::create_dir_all(roots.draft_pages_root())?;
        std::fs::create_dir_all(roots.published_pages_root())?;
        Ok(roots)
    }

    pub fn browsable_root(&self) -> &Path {
        &self.browsable
    }

    pub fn draft_pages_root(&self) -> PathBuf {
        self.browsable.join(&self.draft_dir_name)
    }

    pub fn published_pages_root(&self) -> PathBuf {
        self.browsable.join(&self.published_dir_name)
    }

    pub fn draft_dir_name(&self) -> &str {
        &self.draft_dir_name
    }

    pub fn published_dir_name(&self) -> &str {
        &self.published_dir_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_root_is_valid() {
        let config = ServerConfig::for_root("/srv/site");
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_socket(), "127.0.0.1:0");
    }

    #[test]
    fn test_rejects_empty_root() {
        let config = ServerConfig::for_root("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nested_page_dir_names() {
        let mut config = ServerConfig::for_root("/srv/site");
        config.draft_pages_dir = "a/pages".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::for_root("/srv/site");
        config.published_pages_dir = "..".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_identical_page_dirs() {
        let mut config = ServerConfig::for_root("/srv/site");
        config.published_pages_dir = config.draft_pages_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = ServerConfig::for_root("/srv/site");
        config.max_clients = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::for_root("/srv/site");
        config.max_command_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_root_paths_layout() {
        let roots = ServerConfig::for_root("/srv/site").root_paths();
        assert_eq!(roots.browsable_root(), Path::new("/srv/site"));
        assert_eq!(roots.draft_pages_root(), PathBuf::from("/srv/site/pages"));
        assert_eq!(
            roots.published_pages_root(),
            PathBuf::from("/srv/site/pub_pages")
        );
    }

    #[test]
    fn test_prepare_creates_page_roots() {
        let dir = tempfile::TempDir::new().unwrap();
        let roots = RootPaths::new(dir.path().join("site")).prepare().unwrap();

        assert!(roots.browsable_root().is_absolute());
        assert!(roots.draft_pages_root().is_dir());
        assert!(roots.published_pages_root().is_dir());
    }
}
