//! Admin authorization
//!
//! The registry never checks who is calling. Admin routes require the shared
//! admin token (`Authorization: Bearer` or `x-admin-token`). An
//! `x-admin-address` header is only attribution: it is never a credential on
//! its own, but when an admin predicate is configured the attributed address
//! must also pass it.

use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::warn;

/// Decides whether an address may run admin operations.
pub type AdminPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Header naming the admin on whose behalf the call is made.
pub const ADMIN_ADDRESS_HEADER: &str = "x-admin-address";

/// Header carrying the admin token (alternative to `Authorization: Bearer`).
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Clone, Default)]
pub struct AdminAllowlist {
    addresses: Vec<String>,
}

impl AdminAllowlist {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| a.as_ref().trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        let address = address.trim();
        self.addresses.iter().any(|a| a.eq_ignore_ascii_case(address))
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn into_predicate(self) -> AdminPredicate {
        Arc::new(move |addr: &str| self.contains(addr))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCheck {
    /// Authorized; carries the attributed address or "token" for logging
    Authorized(String),
    /// No admin token presented
    Missing,
    /// A token was presented but rejected, or the attributed address was
    Forbidden(String),
}

#[derive(Clone)]
pub struct AdminAuth {
    token: Option<String>,
    predicate: Option<AdminPredicate>,
}

impl AdminAuth {
    /// Without a token every admin call is rejected.
    pub fn new(token: Option<String>, predicate: Option<AdminPredicate>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            predicate,
        }
    }

    /// Token auth restricted to allowlisted addresses. An empty allowlist
    /// leaves the attributed address unrestricted.
    pub fn allowlist(allowlist: AdminAllowlist, token: Option<String>) -> Self {
        let predicate = if allowlist.is_empty() {
            None
        } else {
            Some(allowlist.into_predicate())
        };
        Self::new(token, predicate)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn presented_token(headers: &HeaderMap) -> Option<&str> {
        if let Some(s) = headers.get("authorization").and_then(|hv| hv.to_str().ok()) {
            if let Some(rest) = s.strip_prefix("Bearer ") {
                return Some(rest.trim());
            }
        }
        headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|hv| hv.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn check(&self, headers: &HeaderMap) -> AdminCheck {
        let presented = match Self::presented_token(headers) {
            Some(t) => t,
            None => return AdminCheck::Missing,
        };
        if !matches!(&self.token, Some(expected) if expected == presented) {
            warn!("[ADMIN AUTH] Rejected admin token");
            return AdminCheck::Forbidden("bearer token".to_string());
        }

        let address = headers
            .get(ADMIN_ADDRESS_HEADER)
            .and_then(|hv| hv.to_str().ok())
            .map(str::trim)
            .filter(|a| !a.is_empty());

        match (address, &self.predicate) {
            (Some(addr), Some(allowed)) if !allowed(addr) => {
                warn!("[ADMIN AUTH] Token valid but {} is not an admin", addr);
                AdminCheck::Forbidden(addr.to_string())
            }
            (Some(addr), _) => AdminCheck::Authorized(addr.to_string()),
            (None, _) => AdminCheck::Authorized("token".to_string()),
        }
    }
}
