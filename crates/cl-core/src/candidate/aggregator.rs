//! Folding comment records into candidates

use std::collections::HashMap;

use tracing::info;

use crate::api::{HttpClient, SignedClient};
use crate::comment::{CommentPage, PaginatedCommentSource, Reply};
use crate::error::Result;
use crate::types::{Candidate, CommentQuery};

/// One candidate per distinct comment author, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct CandidateAggregator {
    /// uid -> position in `candidates`
    index: HashMap<String, usize>,
    candidates: Vec<Candidate>,
}

impl CandidateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one comment record
    pub fn add_reply(&mut self, reply: &Reply) {
        let member = &reply.member;
        match self.index.get(&member.mid) {
            Some(&position) => {
                let candidate = &mut self.candidates[position];
                candidate.display_name = member.uname.clone();
                candidate.avatar_url = member.avatar.clone();
                candidate.liked_by_self |= reply.liked_by_self();
                candidate.liked_by_up |= reply.liked_by_up();
            }
            None => {
                let mut candidate = Candidate::new(&member.mid, &member.uname, &member.avatar);
                candidate.liked_by_self = reply.liked_by_self();
                candidate.liked_by_up = reply.liked_by_up();
                self.index.insert(member.mid.clone(), self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    pub fn add_page(&mut self, page: &CommentPage) {
        for reply in &page.replies {
            self.add_reply(reply);
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Called after each page with the page number and the candidate count so far
pub trait AggregationProgress {
    fn on_page(&mut self, page: usize, candidates: usize);
}

impl<F: FnMut(usize, usize)> AggregationProgress for F {
    fn on_page(&mut self, page: usize, candidates: usize) {
        self(page, candidates)
    }
}

/// Fetch every page of a listing and aggregate its authors
pub async fn fetch_candidates<C: HttpClient>(
    client: &SignedClient<C>,
    query: &CommentQuery,
) -> Result<Vec<Candidate>> {
    fetch_candidates_with_progress(client, query, |_: usize, _: usize| {}).await
}

/// [`fetch_candidates`] with a progress observer.
///
/// The first failed page aborts the run; nothing aggregated so far is returned.
pub async fn fetch_candidates_with_progress<C, P>(
    client: &SignedClient<C>,
    query: &CommentQuery,
    mut progress: P,
) -> Result<Vec<Candidate>>
where
    C: HttpClient,
    P: AggregationProgress,
{
    info!(%query, "Fetching comments");

    let mut source = PaginatedCommentSource::new(client, query.clone());
    let mut aggregator = CandidateAggregator::new();

    while let Some(page) = source.next_page().await {
        let page = page.map_err(|e| {
            e.with_context(format!("fetching comment page {}", source.pages_fetched() + 1))
        })?;
        aggregator.add_page(&page);
        progress.on_page(page.number, aggregator.len());
    }

    info!(
        pages = source.pages_fetched(),
        candidates = aggregator.len(),
        "Comments fetched"
    );
    Ok(aggregator.into_candidates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::ScriptedHttpClient;
    use crate::comment::source::fixtures::{page, reply, requested_offset, signed};
    use crate::error::LotteryError;
    use crate::types::Relation;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn parsed(mid: &str, action: i64, up_like: bool) -> Reply {
        serde_json::from_value(reply(mid, action, up_like)).unwrap()
    }

    #[test]
    fn test_flags_accumulate_per_uid() {
        let mut aggregator = CandidateAggregator::new();
        aggregator.add_reply(&parsed("42", 0, false));
        aggregator.add_reply(&parsed("42", 1, false));
        aggregator.add_reply(&parsed("42", 0, true));

        let candidates = aggregator.into_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].uid, "42");
        assert!(candidates[0].liked_by_self);
        assert!(candidates[0].liked_by_up);
        assert_eq!(candidates[0].relation, Relation::None);
    }

    #[test]
    fn test_flags_never_reset() {
        let mut aggregator = CandidateAggregator::new();
        aggregator.add_reply(&parsed("7", 1, true));
        aggregator.add_reply(&parsed("7", 2, false));

        let candidates = aggregator.into_candidates();
        assert!(candidates[0].liked_by_self);
        assert!(candidates[0].liked_by_up);
    }

    #[test]
    fn test_profile_is_last_write_wins() {
        let mut aggregator = CandidateAggregator::new();
        aggregator.add_reply(&parsed("1", 0, false));
        let mut renamed = parsed("1", 0, false);
        renamed.member.uname = "renamed".to_string();
        renamed.member.avatar = "https://i0/new.jpg".to_string();
        aggregator.add_reply(&renamed);

        let candidates = aggregator.into_candidates();
        assert_eq!(candidates[0].display_name, "renamed");
        assert_eq!(candidates[0].avatar_url, "https://i0/new.jpg");
    }

    #[tokio::test]
    async fn test_fetch_across_pages_dedups() {
        let http = ScriptedHttpClient::new().route("/x/v2/reply/wbi/main", |request| {
            Ok(match requested_offset(request).as_str() {
                "" => page(vec![reply("42", 0, false), reply("1", 0, false)], "a", false),
                "a" => page(vec![reply("42", 1, false), reply("2", 0, false)], "b", false),
                _ => page(vec![reply("42", 0, true), reply("1", 1, false)], "", true),
            })
        });
        let client = signed(http);

        let mut seen = Vec::new();
        let candidates = fetch_candidates_with_progress(
            &client,
            &CommentQuery::new("123", "11"),
            |page: usize, count: usize| seen.push((page, count)),
        )
        .await
        .unwrap();

        let uids: Vec<_> = candidates.iter().map(|c| c.uid.as_str()).collect();
        assert_eq!(uids, vec!["42", "1", "2"]);
        let distinct: HashSet<_> = uids.iter().collect();
        assert_eq!(distinct.len(), uids.len());

        let u42 = &candidates[0];
        assert!(u42.liked_by_self && u42.liked_by_up);
        assert!(candidates[1].liked_by_self);
        assert!(!candidates[2].liked_by_self);

        assert_eq!(seen, vec![(1, 2), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_with_stage() {
        let http = ScriptedHttpClient::new().route("/x/v2/reply/wbi/main", |request| {
            if requested_offset(request).is_empty() {
                Ok(page(vec![reply("1", 0, false)], "next", false))
            } else {
                Err(LotteryError::Transport("connection reset".to_string()))
            }
        });
        let client = signed(http);

        let err = fetch_candidates(&client, &CommentQuery::new("123", "11"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "fetching comment page 2: Transport error: connection reset"
        );
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let http = ScriptedHttpClient::new().route("/x/v2/reply/wbi/main", |_| {
            Ok(json!({
                "code": 0,
                "message": "0",
                "data": {"cursor": {"is_end": true, "pagination_reply": {}}, "replies": null}
            }))
        });
        let client = signed(http);
        let candidates = fetch_candidates(&client, &CommentQuery::new("1", "1"))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }
}
