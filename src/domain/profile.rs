use serde::{Deserialize, Serialize};

/// The single local user. Persisted in the app-config table rather than a
/// dedicated users table; remote identities are out of scope for this build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: String,
    pub onboarding_complete: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            onboarding_complete: false,
        }
    }
}
