//! Custom assertion macros for API tests

#![allow(unused_macros)]

/// Assert a response's status and, for errors, its `code`
///
/// ```ignore
/// let (status, body) = app.get("/api/users/me", None).await;
/// assert_api_error!(status, body, 401, "invalid_token");
/// ```
macro_rules! assert_api_error {
    ($status:expr, $body:expr, $expected_status:expr, $expected_code:expr) => {{
        assert_eq!(
            $status.as_u16(),
            $expected_status,
            "unexpected status, body: {}",
            $body
        );
        assert_eq!(
            $body["code"], $expected_code,
            "unexpected error code, body: {}",
            $body
        );
        assert_eq!($body["status"], $expected_status);
    }};
}

/// Assert a success status, printing the body on failure
macro_rules! assert_status {
    ($status:expr, $body:expr, $expected_status:expr) => {
        assert_eq!(
            $status.as_u16(),
            $expected_status,
            "unexpected status, body: {}",
            $body
        );
    };
}

/// Assert that a string contains a substring
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
