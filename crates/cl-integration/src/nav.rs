//! Login status and signing key lookup

use cl_core::api::headers::{api_headers, ApiHeaderOptions};
use cl_core::api::{ApiEnvelope, Endpoints, HttpClient};
use cl_core::error::{LotteryError, Result};
use cl_core::signing::key_from_url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

const ENDPOINT: &str = "nav";

fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) if n.as_i64() != Some(0) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() && s != "0" => Some(s),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct WbiImg {
    img_url: String,
    sub_url: String,
}

#[derive(Debug, Deserialize)]
struct NavData {
    #[serde(rename = "isLogin", default)]
    is_login: bool,
    #[serde(default, deserialize_with = "optional_id")]
    mid: Option<String>,
    #[serde(default)]
    uname: Option<String>,
    wbi_img: WbiImg,
}

/// What `nav` says about the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavInfo {
    pub is_login: bool,
    pub mid: Option<String>,
    pub uname: Option<String>,
    pub img_key: String,
    pub sub_key: String,
}

/// Query `nav`.
///
/// The endpoint answers with a non-zero code when the session is not logged
/// in, but still carries the key material, so the code is not checked.
pub async fn fetch_nav<C: HttpClient>(http: &C, endpoints: &Endpoints) -> Result<NavInfo> {
    let body = http
        .get_json(
            &endpoints.nav(),
            &[],
            &api_headers(ApiHeaderOptions {
                referer: Some("https://www.bilibili.com/"),
                ..Default::default()
            }),
        )
        .await?;

    let envelope = ApiEnvelope::<NavData>::parse(ENDPOINT, body)?;
    let code = envelope.code;
    let data = envelope.data.ok_or(LotteryError::Api {
        code,
        message: if envelope.message.is_empty() {
            "nav response carried no data".to_string()
        } else {
            envelope.message
        },
    })?;

    let info = NavInfo {
        is_login: data.is_login,
        mid: data.mid,
        uname: data.uname.filter(|u| !u.is_empty()),
        img_key: key_from_url(&data.wbi_img.img_url).to_string(),
        sub_key: key_from_url(&data.wbi_img.sub_url).to_string(),
    };
    debug!(code, is_login = info.is_login, "nav fetched");
    Ok(info)
}
