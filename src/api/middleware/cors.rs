//! CORS middleware configuration.

use tower_http::cors::CorsLayer;

/// Create a CORS layer with permissive settings for development.
///
/// This allows all origins, methods, and headers. For production,
/// you should configure more restrictive CORS settings.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Create a CORS layer restricted to the given origins, methods, and headers.
#[allow(dead_code)]
pub fn create_custom_cors_layer(
    allowed_origins: Vec<String>,
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
) -> CorsLayer {
    use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins.iter().filter_map(|s| s.parse().ok()),
        ))
        .allow_methods(AllowMethods::list(
            allowed_methods.iter().filter_map(|s| s.parse().ok()),
        ))
        .allow_headers(AllowHeaders::list(
            allowed_headers.iter().filter_map(|s| s.parse().ok()),
        ))
}
