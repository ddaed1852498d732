use url::Url;

/// Whether the admin UI is unlocked. This only gates what the page shows;
/// the server checks the same secret on every admin request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminMode {
    key: Option<String>,
}

impl AdminMode {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Unlocks when the `admin` query parameter of `page_url` equals `secret`.
    pub fn from_page_url(page_url: &str, secret: &str) -> Self {
        let Ok(url) = Url::parse(page_url) else {
            tracing::debug!("Ignoring unparseable page URL: {}", page_url);
            return Self::disabled();
        };

        let provided = url
            .query_pairs()
            .find(|(name, _)| name == "admin")
            .map(|(_, value)| value.into_owned());

        Self::from_key(provided.as_deref(), secret)
    }

    pub fn from_key(provided: Option<&str>, secret: &str) -> Self {
        match provided {
            Some(key) if !secret.is_empty() && key == secret => {
                tracing::info!("Admin mode activated");
                Self {
                    key: Some(key.to_string()),
                }
            }
            _ => Self::disabled(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.key.is_some()
    }

    /// The secret to send with admin requests.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_query_parameter_unlocks() {
        let mode = AdminMode::from_page_url("https://run.club/?admin=runclub2024", "runclub2024");
        assert!(mode.is_admin());
        assert_eq!(mode.key(), Some("runclub2024"));
    }

    #[test]
    fn test_wrong_or_missing_parameter_stays_locked() {
        assert!(!AdminMode::from_page_url("https://run.club/?admin=nope", "runclub2024").is_admin());
        assert!(!AdminMode::from_page_url("https://run.club/", "runclub2024").is_admin());
        assert!(!AdminMode::from_page_url("not a url", "runclub2024").is_admin());
    }

    #[test]
    fn test_empty_secret_never_unlocks() {
        assert!(!AdminMode::from_key(Some(""), "").is_admin());
    }
}
