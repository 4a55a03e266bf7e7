//! Candidate filtering

use serde::{Deserialize, Serialize};

use crate::types::{Candidate, FilterCriteria, Relation};

/// Whether `actual` satisfies any of the `requested` relations; an empty
/// request matches everything
pub fn relation_matches<'a>(
    requested: impl IntoIterator<Item = &'a Relation>,
    actual: Relation,
) -> bool {
    let mut requested = requested.into_iter().peekable();
    requested.peek().is_none() || requested.any(|&r| actual.satisfies(r))
}

/// Whether a candidate passes every check in `criteria`
pub fn candidate_matches(candidate: &Candidate, criteria: &FilterCriteria) -> bool {
    let relation_ok = relation_matches(&criteria.relations, candidate.relation);

    relation_ok
        && (!criteria.require_liked_by_up || candidate.liked_by_up)
        && (!criteria.require_liked_by_self || candidate.liked_by_self)
}

/// Candidates split by [`candidate_matches`], input order kept in each half
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSplit {
    pub matched: Vec<Candidate>,
    pub unmatched: Vec<Candidate>,
}

/// Partition candidates into matched and unmatched
pub fn filter_candidates(candidates: Vec<Candidate>, criteria: &FilterCriteria) -> FilterSplit {
    let (matched, unmatched) = candidates
        .into_iter()
        .partition(|c| candidate_matches(c, criteria));
    FilterSplit { matched, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_relations() -> Vec<Candidate> {
        vec![
            Candidate::new("1", "none", "").with_relation(Relation::None),
            Candidate::new("2", "fan", "").with_relation(Relation::Fan),
            Candidate::new("3", "follow", "").with_relation(Relation::Follow),
            Candidate::new("4", "mutual", "").with_relation(Relation::Mutual),
        ]
    }

    fn uids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.uid.as_str()).collect()
    }

    #[test]
    fn test_relation_expansion_table() {
        use Relation::*;
        let expected = [
            (None, None, true),
            (None, Follow, false),
            (None, Fan, false),
            (None, Mutual, false),
            (Follow, None, false),
            (Follow, Follow, true),
            (Follow, Fan, false),
            (Follow, Mutual, true),
            (Fan, None, false),
            (Fan, Follow, false),
            (Fan, Fan, true),
            (Fan, Mutual, true),
            (Mutual, None, false),
            (Mutual, Follow, false),
            (Mutual, Fan, false),
            (Mutual, Mutual, true),
        ];
        for (requested, actual, matches) in expected {
            assert_eq!(
                relation_matches(&[requested], actual),
                matches,
                "requested {} actual {}",
                requested,
                actual
            );
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let split = filter_candidates(with_relations(), &FilterCriteria::new());
        assert_eq!(split.matched, with_relations());
        assert!(split.unmatched.is_empty());
        assert!(relation_matches(&FilterCriteria::new().relations, Relation::Mutual));
    }

    #[test]
    fn test_candidate_check_agrees_with_relation_table() {
        let sets: Vec<FilterCriteria> = vec![
            FilterCriteria::new(),
            FilterCriteria::new().with_relation(Relation::Fan),
            FilterCriteria::new()
                .with_relation(Relation::None)
                .with_relation(Relation::Mutual),
            FilterCriteria::new()
                .with_relation(Relation::Follow)
                .with_relation(Relation::Fan),
        ];
        for criteria in &sets {
            for candidate in with_relations() {
                let requested: Vec<Relation> = criteria.relations.iter().copied().collect();
                assert_eq!(
                    candidate_matches(&candidate, criteria),
                    relation_matches(&requested, candidate.relation),
                    "criteria {} candidate {}",
                    criteria.describe(),
                    candidate.relation
                );
            }
        }
    }

    #[test]
    fn test_fan_matches_fan_and_mutual() {
        let criteria = FilterCriteria::new().with_relation(Relation::Fan);
        let split = filter_candidates(with_relations(), &criteria);
        assert_eq!(uids(&split.matched), vec!["2", "4"]);
        assert_eq!(uids(&split.unmatched), vec!["1", "3"]);
    }

    #[test]
    fn test_mutual_does_not_match_fan() {
        let criteria = FilterCriteria::new().with_relation(Relation::Mutual);
        let split = filter_candidates(with_relations(), &criteria);
        assert_eq!(uids(&split.matched), vec!["4"]);
    }

    #[test]
    fn test_relation_set_is_a_union() {
        let criteria = FilterCriteria::new()
            .with_relation(Relation::None)
            .with_relation(Relation::Follow);
        let split = filter_candidates(with_relations(), &criteria);
        assert_eq!(uids(&split.matched), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_like_requirements() {
        let mut a = Candidate::new("a", "a", "");
        a.liked_by_up = true;
        let mut b = Candidate::new("b", "b", "");
        b.liked_by_self = true;
        let mut c = Candidate::new("c", "c", "");
        c.liked_by_up = true;
        c.liked_by_self = true;
        let candidates = vec![a, b, c];

        let split = filter_candidates(candidates.clone(), &FilterCriteria::new().liked_by_up());
        assert_eq!(uids(&split.matched), vec!["a", "c"]);

        let split = filter_candidates(candidates.clone(), &FilterCriteria::new().liked_by_self());
        assert_eq!(uids(&split.matched), vec!["b", "c"]);

        let both = FilterCriteria::new().liked_by_up().liked_by_self();
        let split = filter_candidates(candidates, &both);
        assert_eq!(uids(&split.matched), vec!["c"]);
        assert_eq!(uids(&split.unmatched), vec!["a", "b"]);
    }

    #[test]
    fn test_partition_is_disjoint_and_exhaustive() {
        let criteria = FilterCriteria::new()
            .with_relation(Relation::Follow)
            .liked_by_up();
        let mut input = with_relations();
        input[2].liked_by_up = true;
        input[3].liked_by_up = true;

        let split = filter_candidates(input.clone(), &criteria);
        assert_eq!(split.matched.len() + split.unmatched.len(), input.len());
        for candidate in &input {
            let in_matched = split.matched.contains(candidate);
            let in_unmatched = split.unmatched.contains(candidate);
            assert!(in_matched != in_unmatched);
        }
        assert_eq!(uids(&split.matched), vec!["3", "4"]);
    }
}
