/// Base URL of the prediction service, fixed when the bundle is built.
pub const SERVICE_BASE_URL: &str = match option_env!("CHILI_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};

/// Requests still pending after this long are reported as failed.
pub const REQUEST_TIMEOUT_MS: u32 = 30_000;
