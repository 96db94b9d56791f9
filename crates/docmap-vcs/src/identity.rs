//! Author identity resolution.
//!
//! GitHub noreply addresses encode the account handle directly
//! (`12345+octocat@users.noreply.github.com`), so most lookups never leave
//! the process. Avatar URLs come from the public users API. Both directions
//! are cached per resolver instance, negative answers included, so each
//! email and each handle costs at most one lookup per run.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use ureq::Agent;

/// Request timeout for profile lookups.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API endpoint.
const DEFAULT_API_BASE: &str = "https://api.github.com";

static ID_NOREPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\+(.+)@users\.noreply\.github\.com$").expect("valid regex")
});

static PLAIN_NOREPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)@users\.noreply\.github\.com$").expect("valid regex"));

/// Extract the account handle from a noreply commit email, if it is one.
pub(crate) fn handle_from_noreply(email: &str) -> Option<String> {
    if let Some(captures) = ID_NOREPLY.captures(email) {
        return Some(captures[2].to_owned());
    }
    if let Some(captures) = PLAIN_NOREPLY.captures(email) {
        let user = &captures[1];
        // Older noreply forms can still carry a "+"-joined prefix.
        let user = user.rsplit('+').next().unwrap_or(user);
        return Some(user.to_owned());
    }
    None
}

/// Public profile fields returned by the users API.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Account handle.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Profile page URL.
    pub html_url: String,
}

/// Email-to-handle and handle-to-profile resolver with run-scoped caches.
///
/// Construct one per build run and share it with every component that needs
/// author identities; the caches are internal, so lookups take `&self`.
pub struct IdentityResolver {
    agent: Agent,
    api_base: String,
    user_agent: String,
    handles: Mutex<HashMap<String, Option<String>>>,
    profiles: Mutex<HashMap<String, Option<Profile>>>,
}

impl IdentityResolver {
    /// Create a resolver identifying itself as `user_agent` to the API.
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            api_base: DEFAULT_API_BASE.to_owned(),
            user_agent: user_agent.to_owned(),
            handles: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Override the API endpoint. Used by tests.
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_owned();
        self
    }

    /// Pre-populate the email cache with a known mapping.
    ///
    /// Commits often carry an author's real email next to commits carrying
    /// their noreply address; seeding transfers the handle learned from the
    /// latter onto the former.
    pub fn seed(&self, email: &str, handle: Option<String>) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.entry(email.to_owned()).or_insert(handle);
    }

    /// Resolve a commit email to an account handle.
    ///
    /// Answers, including "unknown", are cached for the life of the
    /// resolver.
    pub fn handle_for_email(&self, email: &str) -> Option<String> {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .entry(email.to_owned())
            .or_insert_with(|| handle_from_noreply(email))
            .clone()
    }

    /// Avatar URL for a handle, fetched from the users API at most once.
    pub fn avatar_url(&self, handle: &str) -> Option<String> {
        self.profile(handle).map(|p| p.avatar_url)
    }

    /// Resolve a commit email to `(handle, avatar_url)` in one step.
    pub fn resolve(&self, email: &str) -> (Option<String>, Option<String>) {
        let handle = self.handle_for_email(email);
        let avatar = handle.as_deref().and_then(|h| self.avatar_url(h));
        (handle, avatar)
    }

    /// Cached profile lookup.
    pub fn profile(&self, handle: &str) -> Option<Profile> {
        {
            let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = profiles.get(handle) {
                return cached.clone();
            }
        }

        // Fetch outside the lock; a duplicate fetch on a race is harmless.
        let profile = self.fetch_profile(handle);
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        profiles.insert(handle.to_owned(), profile.clone());
        profile
    }

    fn fetch_profile(&self, handle: &str) -> Option<Profile> {
        let url = format!("{}/users/{handle}", self.api_base);
        let response = match self
            .agent
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .call()
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(handle, error = %err, "profile request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(handle, status = %response.status(), "no profile for handle");
            return None;
        }

        match response.into_body().read_json::<Profile>() {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(handle, error = %err, "failed to decode profile");
                None
            }
        }
    }
}
