//! Keyword admission control over retrieved hits.
//!
//! Two strategies produce the same admitted set for the same keywords:
//! [`filter_by_id_set`] works from ids resolved once up front, while
//! [`filter_by_keyword_lookup`] asks the keyword index about each hit's owner.
//! Neither mutates its input and neither fails.

use tracing::{error, warn};

use crate::traits::KeywordIndex;
use crate::types::{Hit, KeywordSet, RelevantIdSet};

/// Keep hits whose owner is in `relevant`. `None` keeps everything.
pub fn filter_by_id_set(hits: &[Hit], relevant: Option<&RelevantIdSet>) -> Vec<Hit> {
    match relevant {
        None => hits.to_vec(),
        Some(ids) => hits
            .iter()
            .filter(|h| h.source_id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect(),
    }
}

/// Keep hits whose owner is tagged with at least one of `keywords`.
///
/// Hits without an owner id, or whose lookup fails, are dropped and logged.
pub fn filter_by_keyword_lookup(hits: &[Hit], keywords: &KeywordSet, index: &dyn KeywordIndex) -> Vec<Hit> {
    if keywords.is_empty() {
        return hits.to_vec();
    }
    let mut admitted = Vec::new();
    for hit in hits {
        let Some(item_id) = hit.source_id else {
            warn!(origin = ?hit.origin, "no item id found for hit; dropping");
            continue;
        };
        match index.keywords_for_item(item_id) {
            Ok(tags) if keywords.intersects(&tags) => admitted.push(hit.clone()),
            Ok(_) => {}
            Err(e) => error!(item_id, error = %format!("{e:#}"), "error fetching keywords for item; dropping hit"),
        }
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordResolver;
    use crate::types::{ItemId, Origin};
    use anyhow::anyhow;
    use std::collections::BTreeSet;

    struct Tags;

    impl KeywordIndex for Tags {
        fn keywords_for_item(&self, item_id: ItemId) -> anyhow::Result<Vec<String>> {
            match item_id {
                1 => Ok(vec!["Climate".into(), "science".into()]),
                2 => Ok(vec!["ocean".into()]),
                3 => Ok(vec!["climate".into(), "Ocean".into()]),
                4 => Err(anyhow!("row locked")),
                _ => Ok(Vec::new()),
            }
        }

        fn items_for_keyword(&self, keyword: &str) -> anyhow::Result<Vec<ItemId>> {
            Ok([1, 2, 3, 5]
                .into_iter()
                .filter(|id| {
                    self.keywords_for_item(*id)
                        .map(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(keyword)))
                        .unwrap_or(false)
                })
                .collect())
        }
    }

    fn hits() -> Vec<Hit> {
        vec![
            Hit::new("a", Some(1), Origin::Vector),
            Hit::new("b", Some(2), Origin::Vector),
            Hit::new("c", Some(3), Origin::FullText),
            Hit::new("d", Some(5), Origin::FullText),
            Hit::new("e", Some(1), Origin::FullText),
        ]
    }

    fn ids(hits: &[Hit]) -> Vec<Option<ItemId>> {
        hits.iter().map(|h| h.source_id).collect()
    }

    #[test]
    fn id_set_none_is_identity() {
        assert_eq!(filter_by_id_set(&hits(), None), hits());
    }

    #[test]
    fn empty_id_set_admits_nothing() {
        assert!(filter_by_id_set(&hits(), Some(&BTreeSet::new())).is_empty());
    }

    #[test]
    fn id_set_keeps_members_in_order() {
        let relevant: RelevantIdSet = [1, 3].into_iter().collect();
        assert_eq!(ids(&filter_by_id_set(&hits(), Some(&relevant))), vec![Some(1), Some(3), Some(1)]);
    }

    #[test]
    fn keyword_lookup_empty_is_identity() {
        assert_eq!(filter_by_keyword_lookup(&hits(), &KeywordSet::default(), &Tags), hits());
    }

    #[test]
    fn keyword_lookup_drops_unresolvable_and_failing_hits() {
        let input = vec![
            Hit::new("no id", None, Origin::Vector),
            Hit::new("locked", Some(4), Origin::Vector),
            Hit::new("ocean", Some(2), Origin::Vector),
        ];
        let kept = filter_by_keyword_lookup(&input, &KeywordSet::parse("OCEAN"), &Tags);
        assert_eq!(ids(&kept), vec![Some(2)]);
    }

    #[test]
    fn both_strategies_agree() {
        for raw in ["climate", "ocean", "science,ocean", "missing"] {
            let keywords = KeywordSet::parse(raw);
            let resolved = KeywordResolver::new(&Tags).resolve(&keywords);
            let by_ids = filter_by_id_set(&hits(), Some(&resolved));
            let by_lookup = filter_by_keyword_lookup(&hits(), &keywords, &Tags);
            assert_eq!(ids(&by_ids), ids(&by_lookup), "keywords {raw:?}");
        }
    }
}
