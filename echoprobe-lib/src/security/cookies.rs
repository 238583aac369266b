use http::header::SET_COOKIE;
use http::HeaderMap;

/// The parts of a `Set-Cookie` header the security suite cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

impl SetCookie {
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            secure: false,
            http_only: false,
            same_site: None,
        };

        for attr in parts {
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (attr.trim(), None),
            };
            if key.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if key.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            } else if key.eq_ignore_ascii_case("samesite") {
                cookie.same_site = val.map(str::to_string);
            }
        }
        Some(cookie)
    }
}

/// First cookie called `name` set by a response
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<SetCookie> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(SetCookie::parse)
        .find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_attributes() {
        let cookie =
            SetCookie::parse("sessionid=abc123; expires=Thu, 01 Jan 2099 00:00:00 GMT; HttpOnly; Path=/; SameSite=Lax; Secure");
        assert_eq!(
            cookie,
            Some(SetCookie {
                name: "sessionid".into(),
                value: "abc123".into(),
                secure: true,
                http_only: true,
                same_site: Some("Lax".into()),
            })
        );
    }

    #[test]
    fn test_find_among_several() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("csrftoken=tok; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("sessionid=s1; HttpOnly"));

        let csrf = find_cookie(&headers, "csrftoken");
        assert_eq!(csrf.map(|c| c.value), Some("tok".to_string()));
        assert!(find_cookie(&headers, "sessionid").is_some_and(|c| c.http_only));
        assert!(find_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_rejects_nameless_cookie() {
        assert!(SetCookie::parse("=value").is_none());
        assert!(SetCookie::parse("novalue").is_none());
    }
}
