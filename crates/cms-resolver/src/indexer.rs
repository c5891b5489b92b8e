//! Reference indexing.
//!
//! Turns a page's ordered reference list into a fetch plan: one deduplicated
//! id set per content type. The ordered list itself is left untouched; the
//! assembler needs it later to restore author order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use cms_pages_types::{ChildRef, ContentType, TypeBatch};

/// Group references by content type into unique id sets.
pub fn index(ordered_refs: &[ChildRef]) -> BTreeMap<ContentType, BTreeSet<String>> {
    let mut by_type: BTreeMap<ContentType, BTreeSet<String>> = BTreeMap::new();
    for r in ordered_refs {
        by_type.entry(r.content_type).or_default().insert(r.id.clone());
    }
    by_type
}

/// [`index`] as a list of [`TypeBatch`]es, ordered by content type.
pub fn type_batches(ordered_refs: &[ChildRef]) -> Vec<TypeBatch> {
    index(ordered_refs)
        .into_iter()
        .map(|(content_type, ids)| TypeBatch { content_type, ids })
        .collect()
}

/// Every position each `(type, id)` occupies in the ordered list.
pub fn positions(ordered_refs: &[ChildRef]) -> HashMap<(ContentType, &str), Vec<usize>> {
    let mut map: HashMap<(ContentType, &str), Vec<usize>> = HashMap::new();
    for r in ordered_refs {
        map.entry((r.content_type, r.id.as_str()))
            .or_default()
            .push(r.position);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(items: &[(ContentType, &str)]) -> Vec<ChildRef> {
        items
            .iter()
            .enumerate()
            .map(|(pos, (ty, id))| ChildRef::new(*ty, *id, pos))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(index(&[]).is_empty());
        assert!(type_batches(&[]).is_empty());
    }

    #[test]
    fn test_groups_and_dedups_by_type() {
        let ordered = refs(&[
            (ContentType::CallToAction, "a1"),
            (ContentType::ItemList, "b1"),
            (ContentType::CallToAction, "a2"),
            (ContentType::CallToAction, "a1"),
        ]);

        let indexed = index(&ordered);
        assert_eq!(indexed.len(), 2);
        assert_eq!(
            indexed[&ContentType::CallToAction],
            BTreeSet::from(["a1".to_string(), "a2".to_string()])
        );
        assert_eq!(indexed[&ContentType::ItemList].len(), 1);
    }

    #[test]
    fn test_same_id_under_two_types_stays_separate() {
        let ordered = refs(&[
            (ContentType::HeroBanner, "x"),
            (ContentType::RichText, "x"),
        ]);
        let batches = type_batches(&ordered);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.ids.len() == 1));
    }

    #[test]
    fn test_positions_keep_every_occurrence() {
        let ordered = refs(&[
            (ContentType::CallToAction, "a1"),
            (ContentType::ItemList, "b1"),
            (ContentType::CallToAction, "a1"),
        ]);
        let map = positions(&ordered);
        assert_eq!(map[&(ContentType::CallToAction, "a1")], vec![0, 2]);
        assert_eq!(map[&(ContentType::ItemList, "b1")], vec![1]);
    }
}
