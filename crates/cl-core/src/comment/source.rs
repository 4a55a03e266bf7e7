//! Paginated comment listing

use serde_json::json;
use tracing::debug;

use super::model::{CommentPage, CommentPageData};
use crate::api::headers::{api_headers, ApiHeaderOptions, WIDE_ACCEPT_LANGUAGE};
use crate::api::{ApiEnvelope, HttpClient, QueryParams, SignedClient};
use crate::error::Result;
use crate::types::CommentQuery;

const ENDPOINT: &str = "comment listing";
const WEB_LOCATION: &str = "1315875";

/// Position in the listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// Opaque token naming the next page; empty for the first
    pub offset_token: String,
    /// Set once the last page has been seen
    pub terminal: bool,
}

/// Pull-based sequence over one comment listing, one page per pull.
///
/// A failed pull leaves the cursor where it was; the source does not retry.
pub struct PaginatedCommentSource<'a, C> {
    client: &'a SignedClient<C>,
    query: CommentQuery,
    cursor: PageCursor,
    pages_fetched: usize,
}

impl<'a, C: HttpClient> PaginatedCommentSource<'a, C> {
    pub fn new(client: &'a SignedClient<C>, query: CommentQuery) -> Self {
        Self {
            client,
            query,
            cursor: PageCursor::default(),
            pages_fetched: 0,
        }
    }

    pub fn query(&self) -> &CommentQuery {
        &self.query
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.terminal
    }

    /// Pages successfully fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Option<Result<CommentPage>> {
        if self.cursor.terminal {
            return None;
        }
        Some(self.fetch().await)
    }

    fn params(&self) -> QueryParams {
        QueryParams::new()
            .with("oid", &self.query.oid)
            .with("type", &self.query.kind)
            .with("mode", &self.query.mode)
            .with(
                "pagination_str",
                json!({ "offset": self.cursor.offset_token }).to_string(),
            )
            .with("plat", "1")
            .with("seek_rpid", "")
            .with("web_location", WEB_LOCATION)
    }

    async fn fetch(&mut self) -> Result<CommentPage> {
        let url = self.client.endpoints().comment_list();
        let headers = api_headers(ApiHeaderOptions {
            accept_language: Some(WIDE_ACCEPT_LANGUAGE),
            ..Default::default()
        });

        let body = self.client.get_signed(&url, &self.params(), &headers).await?;
        let data = ApiEnvelope::<CommentPageData>::parse(ENDPOINT, body)?.into_data()?;

        self.pages_fetched += 1;
        self.cursor = PageCursor {
            offset_token: data.cursor.pagination_reply.next_offset.unwrap_or_default(),
            terminal: data.cursor.is_end,
        };

        let replies = data.replies.unwrap_or_default();
        debug!(
            page = self.pages_fetched,
            replies = replies.len(),
            is_end = self.cursor.terminal,
            "fetched comment page"
        );

        Ok(CommentPage {
            number: self.pages_fetched,
            replies,
        })
    }
}
