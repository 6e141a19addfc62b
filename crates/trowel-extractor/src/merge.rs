//! Id-keyed entity merging
//!
//! Each window's reply is folded into the accumulated state by id: the
//! first occurrence of an id wins and later windows re-describing it are
//! dropped. Entities without an id always pass through; the model is
//! instructed to reuse ids, so an id-less entity is treated as new. A
//! model that never assigns ids therefore duplicates freely, which is
//! accepted rather than guessed around.

use trowel_domain::Identified;

/// Fold `incoming` into `accumulated`, first occurrence of an id winning.
pub fn merge_entities<T: Identified>(accumulated: &mut Vec<T>, incoming: Vec<T>) {
    for entity in incoming {
        let duplicate = entity
            .id()
            .is_some_and(|id| accumulated.iter().any(|seen| seen.id() == Some(id)));
        if !duplicate {
            accumulated.push(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_domain::Trench;

    fn trench(id: Option<&str>, number: &str) -> Trench {
        Trench {
            id: id.map(String::from),
            trench_number: Some(number.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_ids_are_appended_in_order() {
        let mut acc = vec![trench(Some("a"), "1")];
        merge_entities(&mut acc, vec![trench(Some("b"), "2"), trench(Some("c"), "3")]);
        let ids: Vec<_> = acc.iter().map(|t| t.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_occurrence_wins_on_duplicate_id() {
        let mut acc = vec![trench(Some("a"), "original")];
        merge_entities(&mut acc, vec![trench(Some("a"), "redescribed")]);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc[0].trench_number.as_deref(), Some("original"));
    }

    #[test]
    fn test_id_less_entities_always_pass_through() {
        let mut acc = vec![trench(None, "1")];
        merge_entities(&mut acc, vec![trench(None, "1"), trench(None, "2")]);
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_duplicate_within_one_batch_is_dropped() {
        let mut acc: Vec<Trench> = Vec::new();
        merge_entities(&mut acc, vec![trench(Some("a"), "1"), trench(Some("a"), "1 again")]);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc[0].trench_number.as_deref(), Some("1"));
    }
}
