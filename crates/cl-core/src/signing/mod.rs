//! Request signing
//!
//! Every authenticated call carries two extra query parameters, `w_rid` and
//! `wts`. `wts` is the unix time in seconds; `w_rid` is the MD5 of the sorted,
//! percent-encoded parameter string followed by a 32-character mix key.
//!
//! The mix key is derived once per session from two key strings published by
//! the `nav` endpoint (see [`SigningContext`]); signing itself is a pure
//! function of the parameters, the mix key and the timestamp.

mod context;
mod signer;

pub use context::{key_from_url, SigningContext, MIX_KEY_TABLE};
pub use signer::{canonical_query, sign, RequestSigner, Signature, SIGNATURE_KEY, TIMESTAMP_KEY};
