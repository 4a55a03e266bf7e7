//! Browser-like request header presets

/// Desktop browser user agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/145.0.0.0 Safari/537.36";

const SEC_CH_UA: &str = r#""Not:A-Brand";v="99", "Google Chrome";v="145", "Chromium";v="145""#;

/// Accept-Language sent with listing and relation lookups
pub const WIDE_ACCEPT_LANGUAGE: &str = "en-GB,en-US;q=0.9,en;q=0.8,zh-CN;q=0.7,zh;q=0.6";

/// Request headers as ordered name/value pairs
pub type Headers = Vec<(String, String)>;

/// Overrides for [`api_headers`]
#[derive(Debug, Clone, Default)]
pub struct ApiHeaderOptions<'a> {
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub accept_language: Option<&'a str>,
}

fn base_headers() -> Headers {
    [
        ("cache-control", "no-cache"),
        ("pragma", "no-cache"),
        ("sec-ch-ua", SEC_CH_UA),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Headers for cross-site JSON API calls
pub fn api_headers(options: ApiHeaderOptions<'_>) -> Headers {
    let mut headers = base_headers();
    headers.extend(
        [
            ("accept", "*/*"),
            ("accept-language", options.accept_language.unwrap_or("en-GB,en;q=0.9")),
            ("origin", options.origin.unwrap_or("https://www.bilibili.com")),
            ("priority", "u=1, i"),
            ("sec-fetch-dest", "empty"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-site", "same-site"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    if let Some(referer) = options.referer {
        headers.push(("referer".to_string(), referer.to_string()));
    }
    headers
}

/// Headers for top-level page navigation
pub fn document_headers() -> Headers {
    let mut headers = base_headers();
    headers.extend(
        [
            ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
            ("accept-language", "en-GB,en;q=0.9"),
            ("priority", "u=0, i"),
            ("sec-fetch-dest", "document"),
            ("sec-fetch-mode", "navigate"),
            ("sec-fetch-site", "none"),
            ("sec-fetch-user", "?1"),
            ("upgrade-insecure-requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    headers
}
