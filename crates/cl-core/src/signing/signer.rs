//! Parameter signing

use std::collections::BTreeMap;
use std::sync::Arc;

use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::context::SigningContext;
use crate::api::QueryParams;
use crate::clock::{Clock, SystemClock};
use crate::error::{LotteryError, Result};

/// Query key carrying the signature
pub const SIGNATURE_KEY: &str = "w_rid";
/// Query key carrying the signing timestamp
pub const TIMESTAMP_KEY: &str = "wts";

/// Characters left unescaped by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Signature and timestamp to append to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub w_rid: String,
    pub wts: String,
}

impl Signature {
    /// The two query pairs to send alongside the signed parameters
    pub fn into_pairs(self) -> [(String, String); 2] {
        [
            (SIGNATURE_KEY.to_string(), self.w_rid),
            (TIMESTAMP_KEY.to_string(), self.wts),
        ]
    }
}

fn strip_reserved(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '!' | '\'' | '(' | ')' | '*'))
        .collect()
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Build the string that gets hashed: params plus `wts`, sorted by key,
/// values stripped of `!'()*`, percent-encoded, joined with `&`.
///
/// Parameters with no value are left out. Duplicate keys and caller-supplied
/// `wts`/`w_rid` are rejected.
pub fn canonical_query(params: &QueryParams, timestamp: i64) -> Result<String> {
    let wts = timestamp.to_string();
    let mut sorted: BTreeMap<&str, Option<&str>> = BTreeMap::new();

    for (key, value) in params.iter() {
        if key == SIGNATURE_KEY || key == TIMESTAMP_KEY {
            return Err(LotteryError::Precondition(format!(
                "'{}' is reserved for the signer",
                key
            )));
        }
        if sorted.insert(key, value).is_some() {
            return Err(LotteryError::Precondition(format!(
                "duplicate query parameter '{}'",
                key
            )));
        }
    }
    sorted.insert(TIMESTAMP_KEY, Some(wts.as_str()));

    let pairs: Vec<String> = sorted
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?;
            Some(format!("{}={}", encode(key), encode(&strip_reserved(value))))
        })
        .collect();

    Ok(pairs.join("&"))
}

/// Sign `params` at `timestamp` with the session's mix key
pub fn sign(params: &QueryParams, context: &SigningContext, timestamp: i64) -> Result<Signature> {
    let query = canonical_query(params, timestamp)?;

    let mut hasher = Md5::new();
    hasher.update(query.as_bytes());
    hasher.update(context.mix_key().as_bytes());
    let digest = hasher.finalize();

    Ok(Signature {
        w_rid: format!("{:x}", digest),
        wts: timestamp.to_string(),
    })
}

/// Signs requests with one session's key material and a clock
#[derive(Clone)]
pub struct RequestSigner {
    context: SigningContext,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    /// Signer using the system clock
    pub fn new(context: SigningContext) -> Self {
        Self {
            context,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Sign at the current time
    pub fn sign(&self, params: &QueryParams) -> Result<Signature> {
        sign(params, &self.context, self.clock.now_unix())
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("mix_key", &self.context.mix_key())
            .finish_non_exhaustive()
    }
}
