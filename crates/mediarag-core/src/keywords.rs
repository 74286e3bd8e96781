use tracing::{debug, error};

use crate::traits::KeywordIndex;
use crate::types::{KeywordSet, RelevantIdSet};

/// Maps query keywords to the ids of items tagged with any of them.
pub struct KeywordResolver<'a> {
    index: &'a dyn KeywordIndex,
}

impl<'a> KeywordResolver<'a> {
    pub fn new(index: &'a dyn KeywordIndex) -> Self {
        Self { index }
    }

    /// Union of `items_for_keyword` over every keyword.
    ///
    /// A failed lookup only loses that keyword's ids.
    pub fn resolve(&self, keywords: &KeywordSet) -> RelevantIdSet {
        let mut relevant = RelevantIdSet::new();
        for keyword in keywords.iter() {
            match self.index.items_for_keyword(keyword) {
                Ok(ids) => {
                    debug!(keyword, matched = ids.len(), "resolved keyword");
                    relevant.extend(ids);
                }
                Err(e) => error!(keyword, error = %format!("{e:#}"), "error fetching relevant item ids"),
            }
        }
        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;
    use anyhow::anyhow;

    struct Tags;

    impl KeywordIndex for Tags {
        fn keywords_for_item(&self, _item_id: ItemId) -> anyhow::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn items_for_keyword(&self, keyword: &str) -> anyhow::Result<Vec<ItemId>> {
            match keyword {
                "climate" => Ok(vec![1, 2]),
                "ocean" => Ok(vec![2, 3]),
                "broken" => Err(anyhow!("index offline")),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn unions_ids_across_keywords() {
        let ids = KeywordResolver::new(&Tags).resolve(&KeywordSet::parse("Climate, ocean"));
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn failing_keyword_does_not_abort_the_rest() {
        let ids = KeywordResolver::new(&Tags).resolve(&KeywordSet::parse("broken,ocean"));
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn empty_keywords_resolve_to_empty_set() {
        assert!(KeywordResolver::new(&Tags).resolve(&KeywordSet::default()).is_empty());
        assert!(KeywordResolver::new(&Tags).resolve(&KeywordSet::parse("broken")).is_empty());
    }
}
