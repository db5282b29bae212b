//! URL utilities for consistent URL handling
//!
//! The tutoring API follows Django's trailing-slash convention, so endpoint
//! paths here keep their trailing slash while base URLs are normalized to
//! never carry one.

/// Normalize a base URL by removing trailing slashes
///
/// This ensures consistent URL construction when appending endpoints,
/// preventing double slashes in the final URLs.
///
/// # Examples
///
/// ```
/// use chipi::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:8000/api"), "http://127.0.0.1:8000/api");
/// assert_eq!(normalize_base_url("http://127.0.0.1:8000/api/"), "http://127.0.0.1:8000/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and endpoint path
///
/// The endpoint's own trailing slash is preserved; the server treats
/// `/login` and `/login/` as different routes.
///
/// # Examples
///
/// ```
/// use chipi::utils::url::join_endpoint;
///
/// assert_eq!(
///     join_endpoint("http://127.0.0.1:8000/api/", "tutor/chat/"),
///     "http://127.0.0.1:8000/api/tutor/chat/"
/// );
/// ```
pub fn join_endpoint(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/api/"),
            "http://127.0.0.1:8000/api"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/api///"),
            "http://127.0.0.1:8000/api"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/api"),
            "http://127.0.0.1:8000/api"
        );
    }

    #[test]
    fn join_keeps_endpoint_trailing_slash() {
        assert_eq!(
            join_endpoint("http://127.0.0.1:8000/api", "login/"),
            "http://127.0.0.1:8000/api/login/"
        );
        assert_eq!(
            join_endpoint("http://127.0.0.1:8000/api/", "/tutor/chat/"),
            "http://127.0.0.1:8000/api/tutor/chat/"
        );
    }
}
