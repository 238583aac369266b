pub const LOGIN_PATH: &str = "/api/v2/auth/login/";
pub const API_ROOT: &str = "/api/v2/";
pub const GALLERY_PATH: &str = "/api/v2/gallery/";
pub const USER_PATH: &str = "/api/v2/user/";
pub const ROUTINES_PATH: &str = "/api/v2/routines/";
pub const WORKOUTSESSION_PATH: &str = "/api/v2/workoutsession/";
pub const SEARCH_PATH: &str = "/api/v2/search/";
pub const EXERCISES_PATH: &str = "/api/v2/exercises/";
pub const PRIVACY_PATH: &str = "/privacy/";

/// Endpoints that must not answer an anonymous client
pub const PROTECTED_ENDPOINTS: &[&str] =
    &[USER_PATH, WORKOUTSESSION_PATH, ROUTINES_PATH, GALLERY_PATH];

pub const SQL_INJECTION: &[&str] = &["' OR '1'='1", "admin' --", "'; DROP TABLE users; --"];

pub const XSS: &[&str] = &[
    r#"<script>alert("xss")</script>"#,
    r#""><script>alert(String.fromCharCode(88,83,83))</script>"#,
    r#"javascript:alert("xss")"#,
    r#"<img src=x onerror=alert("xss")>"#,
];

pub const PATH_TRAVERSAL: &[&str] =
    &["../../etc/passwd", "..%2F..%2Fetc%2Fpasswd", "....//....//etc/passwd"];

pub const COMMAND_INJECTION: &[&str] = &["; ls -la", "| cat /etc/passwd", "` whoami `", "$(whoami)"];

/// The body echoes markup that would execute in a browser
pub fn reflects_unescaped_markup(body: &str) -> bool {
    body.contains("<script>") || body.contains("onerror=")
}

/// The body looks like a dump of /etc/passwd
pub fn leaks_passwd(body: &str) -> bool {
    body.contains("root:")
}
