/// API path prefix for all versioned routes.
pub const API_PREFIX: &str = "/api/v0";
