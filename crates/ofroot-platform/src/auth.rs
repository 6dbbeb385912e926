use std::fmt;

use crate::error::ApiError;

pub const DEFAULT_SESSION_COOKIE: &str = "token";

/// Session credentials handed explicitly to every action and API call.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: String,
    tenant_id: Option<i64>,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_string(),
            tenant_id: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(String::new())
    }

    pub fn with_tenant(mut self, tenant_id: i64) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Reads the session token (and an optional numeric `tenant_id` cookie)
    /// from a raw `Cookie` header. Missing cookies yield an anonymous context.
    pub fn from_cookie_header(header: Option<&str>, cookie_name: &str) -> Self {
        let Some(header) = header else {
            return Self::anonymous();
        };

        let mut context = Self::new(cookie_value(header, cookie_name).unwrap_or_default());
        context.tenant_id = cookie_value(header, "tenant_id").and_then(|raw| raw.parse().ok());
        context
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn require_token(&self) -> Result<&str, ApiError> {
        if self.is_authenticated() {
            Ok(&self.token)
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    pub fn tenant_id(&self) -> Option<i64> {
        self.tenant_id
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &if self.token.is_empty() { "<none>" } else { "<redacted>" })
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie() {
        let auth = AuthContext::from_cookie_header(
            Some("theme=dark; token=abc123; tenant_id=7"),
            DEFAULT_SESSION_COOKIE,
        );
        assert_eq!(auth.require_token().unwrap(), "abc123");
        assert_eq!(auth.tenant_id(), Some(7));
    }

    #[test]
    fn missing_or_blank_cookie_is_unauthorized() {
        let missing = AuthContext::from_cookie_header(None, DEFAULT_SESSION_COOKIE);
        let blank = AuthContext::from_cookie_header(Some("token=  ; a=b"), DEFAULT_SESSION_COOKIE);
        let other = AuthContext::from_cookie_header(Some("session=xyz"), DEFAULT_SESSION_COOKIE);

        for auth in [missing, blank, other] {
            assert!(!auth.is_authenticated());
            assert!(matches!(auth.require_token(), Err(ApiError::Unauthorized)));
        }
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", AuthContext::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
