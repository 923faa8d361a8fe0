//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use social_backend::outbound::persistence::DbPool;
use social_backend::outbound::token::JwtTokenService;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) tokens: Arc<JwtTokenService>,
}

impl ServerConfig {
    /// Configuration serving `db_pool` on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, tokens: JwtTokenService) -> Self {
        Self {
            bind_addr,
            db_pool,
            tokens: Arc::new(tokens),
        }
    }
}
