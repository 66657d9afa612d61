//! Run configuration resolved from command-line values and the environment.

use std::path::PathBuf;

use crate::client::GgnError;
use crate::client::constants::DEFAULT_BASE_URL;

/// Environment variable consulted when `--token` is not given.
pub const TOKEN_ENV_VAR: &str = "GGN_TOKEN";

/// Console searched when none is given.
pub const DEFAULT_CONSOLE: &str = "Atari 2600";

/// Default output directory.
pub const DEFAULT_WRITE_LOCATION: &str = "./";

/// Everything a run needs, after defaults and fallbacks are applied.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub token: String,
    pub write_location: PathBuf,
    /// When true, download links are printed and nothing is written.
    pub dry_run: bool,
    pub consoles: Vec<String>,
    pub base_url: String,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("token", &"<redacted>")
            .field("write_location", &self.write_location)
            .field("dry_run", &self.dry_run)
            .field("consoles", &self.consoles)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Raw values as they arrive from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub token: Option<String>,
    pub write_location: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub consoles: Vec<String>,
    pub base_url: Option<String>,
}

impl RunConfig {
    /// Resolves a config from `options`, looking the token up in the process
    /// environment when not given explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`GgnError::MissingToken`] when neither source yields a non-blank token.
    pub fn resolve(options: RunOptions) -> Result<Self, GgnError> {
        Self::resolve_with_env(options, |name| std::env::var(name).ok())
    }

    /// Like [`resolve`](Self::resolve) with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GgnError::MissingToken`] when neither source yields a non-blank token.
    pub fn resolve_with_env<F>(options: RunOptions, env: F) -> Result<Self, GgnError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |token: String| {
            let token = token.trim().to_string();
            (!token.is_empty()).then_some(token)
        };
        let token = options
            .token
            .and_then(non_blank)
            .or_else(|| env(TOKEN_ENV_VAR).and_then(non_blank))
            .ok_or(GgnError::MissingToken)?;

        let consoles: Vec<String> = options
            .consoles
            .into_iter()
            .map(|console| console.trim().to_string())
            .filter(|console| !console.is_empty())
            .collect();
        let consoles = if consoles.is_empty() {
            vec![DEFAULT_CONSOLE.to_string()]
        } else {
            consoles
        };

        Ok(Self {
            token,
            write_location: options
                .write_location
                .filter(|path| !path.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WRITE_LOCATION)),
            dry_run: options.dry_run.unwrap_or(true),
            consoles,
            base_url: options
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}
