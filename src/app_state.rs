use std::sync::Arc;

use crate::airdrop::{unix_now, AirdropRegistry};
use crate::auth::AdminAuth;

/// Source of "now" in unix seconds
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Shared state handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    /// The one registry instance for this process
    pub registry: Arc<AirdropRegistry>,

    /// Admin route authorization
    pub auth: AdminAuth,

    /// Wall clock by default; tests pin it
    pub clock: Clock,
}

impl AppState {
    pub fn new(registry: Arc<AirdropRegistry>, auth: AdminAuth) -> Self {
        Self {
            registry,
            auth,
            clock: Arc::new(unix_now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> u64 {
        (self.clock)()
    }
}
