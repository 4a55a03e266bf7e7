//! cl-integration - Remote service integration for comment-lottery
//!
//! This crate connects the core pipeline to the live service.
//!
//! ## Features
//!
//! - reqwest HTTP client with a cookie jar seeded from the configured cookie
//! - `nav` lookup for login status and signing key material
//! - Session setup with a persisted, explicitly invalidated key cache
//! - Login verification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cl_integration::Session;
//!
//! let session = Session::open(&config).await?;
//! let candidates = cl_core::fetch_candidates(session.client(), &query).await?;
//! ```

pub mod http;
pub mod nav;
pub mod session;
pub mod verification;

pub use http::ReqwestHttpClient;
pub use nav::{fetch_nav, NavInfo};
pub use session::{resolve_signing_context, KeyResolution, Session};
pub use verification::{verify_login, VerificationResult};
