use std::time::Duration;

pub const TOKEN_COOKIE: &str = "token";

/// `Set-Cookie` value carrying a freshly issued token.
pub fn token_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    build(token, max_age.as_secs(), secure)
}

/// `Set-Cookie` value that makes the client drop the token cookie.
pub fn cleared_cookie(secure: bool) -> String {
    build("", 0, secure)
}

// Attributes must match between set and clear or browsers keep the old cookie.
fn build(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie =
        format!("{TOKEN_COOKIE}={value}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
