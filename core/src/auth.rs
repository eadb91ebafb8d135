//! Bearer-token storage and the 401 sign-out flow.
//!
//! `AuthSession` owns the token store and the navigator. The first 401 after
//! a sign-in clears the token and redirects to the login route; further 401s
//! only clear again, so a burst of failed requests redirects once.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Where the bearer token lives between requests.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str);
    fn clear(&self);
}

/// Host hook for navigation side effects.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn store(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

/// Token persisted as the sole content of a file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn store(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                tracing::warn!(%error, path = %parent.display(), "failed to create token directory");
                return;
            }
        }
        if let Err(error) = fs::write(&self.path, token) {
            tracing::warn!(%error, path = %self.path.display(), "failed to write token file");
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(error) = fs::remove_file(&self.path) {
                tracing::warn!(%error, path = %self.path.display(), "failed to remove token file");
            }
        }
    }
}

/// Records every redirect. Hosts without a router can poll `current`.
#[derive(Debug, Default)]
pub struct RouteHistory {
    routes: Mutex<Vec<String>>,
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.routes.lock().ok().and_then(|r| r.last().cloned())
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Navigator for RouteHistory {
    fn redirect(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

pub struct AuthSession {
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    redirected: AtomicBool,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("login_route", &self.login_route)
            .field("redirected", &self.redirected.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        login_route: &str,
    ) -> Self {
        Self {
            tokens,
            navigator,
            login_route: login_route.to_string(),
            redirected: AtomicBool::new(false),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.load().filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a fresh token and re-arm the 401 redirect.
    pub fn sign_in(&self, token: &str) {
        self.tokens.store(token);
        self.redirected.store(false, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.tokens.clear();
    }

    /// Clear the token and, the first time since the last sign-in, redirect.
    /// Returns whether a redirect was issued.
    pub fn handle_unauthorized(&self) -> bool {
        self.tokens.clear();
        if self.redirected.swap(true, Ordering::SeqCst) {
            tracing::debug!("401 after redirect already issued; token cleared");
            return false;
        }
        tracing::warn!(route = %self.login_route, "401 received; redirecting to login");
        self.navigator.redirect(&self.login_route);
        true
    }
}
