//! Absolute download links.

use axum::http::HeaderMap;

use crate::config::Config;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Base URL clients should use to reach this server, without a trailing `/`.
///
/// `PROMO_PUBLIC_URL` wins; otherwise the proxy headers, then `Host`, then
/// the bind address.
pub fn public_base_url(headers: &HeaderMap, config: &Config) -> String {
    if let Some(url) = config.public_url.as_deref() {
        return url.trim_end_matches('/').to_owned();
    }
    let proto = header(headers, "x-forwarded-proto").unwrap_or("http");
    let host = header(headers, "x-forwarded-host")
        .or_else(|| header(headers, "host"))
        .map(str::to_owned)
        .unwrap_or_else(|| config.bind_address.replace("0.0.0.0", "localhost"));
    format!("{proto}://{host}")
}

pub fn download_url(base: &str, name: &str) -> String {
    format!("{base}/download/{name}")
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn configured_url_wins() {
        let cfg = Config { public_url: Some("https://cdn.example.com/".into()), ..Config::default() };
        let h = headers(&[("host", "internal:3000")]);
        assert_eq!(public_base_url(&h, &cfg), "https://cdn.example.com");
    }

    #[test]
    fn forwarded_headers_beat_host() {
        let h = headers(&[
            ("host", "internal:3000"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "promo.example.com, proxy.local"),
        ]);
        assert_eq!(public_base_url(&h, &Config::default()), "https://promo.example.com");
    }

    #[test]
    fn falls_back_to_host_then_bind_address() {
        let h = headers(&[("host", "example.test:8080")]);
        assert_eq!(public_base_url(&h, &Config::default()), "http://example.test:8080");
        assert_eq!(public_base_url(&HeaderMap::new(), &Config::default()), "http://localhost:3000");
    }

    #[test]
    fn download_links() {
        assert_eq!(download_url("http://a", "x.jpg"), "http://a/download/x.jpg");
    }
}
