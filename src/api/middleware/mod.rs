// Middleware module - CORS, rate limiting, and browser gateway redirects

pub mod cors;
pub mod gateway;
pub mod rate_limit;

// Re-export for convenience
#[allow(unused_imports)]
pub use cors::{create_cors_layer, create_custom_cors_layer};
pub use gateway::gateway_middleware;
pub use rate_limit::{create_rate_limiter, rate_limit_middleware};
