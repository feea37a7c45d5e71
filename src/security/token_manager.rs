//! Secure token manager with memory-safe handling and masking capabilities
//!
//! Registry keys are held as `secrecy::SecretString` so they never show up in
//! `Debug` output, and any text about to be logged can be scrubbed of them.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Holds the secrets of a run and masks them in log output
///
/// # Examples
///
/// ```
/// use publish_nuget::security::SecureTokenManager;
/// use secrecy::SecretString;
///
/// let manager = SecureTokenManager::new(vec![SecretString::from("oy2secretkey123")]);
/// assert_eq!(
///     manager.mask_tokens_in_string("-k oy2secretkey123"),
///     "-k oy2...123"
/// );
/// ```
#[derive(Debug, Default)]
pub struct SecureTokenManager {
    tokens: Vec<SecretString>,
}

impl SecureTokenManager {
    /// Creates a manager for the given secrets; empty secrets are ignored
    pub fn new(tokens: Vec<SecretString>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|token| !token.expose_secret().is_empty())
            .collect();
        Self { tokens }
    }

    /// Checks if any secret is registered
    pub fn has_tokens(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_nuget::security::SecureTokenManager;
    ///
    /// let manager = SecureTokenManager::default();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < 10 {
            return "****".to_string();
        }

        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }

    /// Masks all registered secrets in a string
    pub fn mask_tokens_in_string(&self, text: &str) -> String {
        let mut masked = text.to_string();

        for token in &self.tokens {
            let token_str = token.expose_secret();
            if let Ok(regex) = Regex::new(&regex::escape(token_str)) {
                let masked_token = self.mask_token(token_str);
                masked = regex
                    .replace_all(&masked, masked_token.as_str())
                    .to_string();
            }
        }

        masked
    }
}
