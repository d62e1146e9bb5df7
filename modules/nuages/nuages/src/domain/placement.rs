use rand::seq::IndexedRandom;

/// Chooses the node that will host a new instance.
pub trait PlacementStrategy: Send + Sync {
    /// Returns `None` only when `nodes` is empty.
    fn select_node(&self, nodes: &[String]) -> Option<String>;
}

/// Uniformly random placement. Load is not taken into account.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPlacement;

impl PlacementStrategy for RandomPlacement {
    fn select_node(&self, nodes: &[String]) -> Option<String> {
        nodes.choose(&mut rand::rng()).cloned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_node_list_yields_none() {
        assert_eq!(RandomPlacement.select_node(&[]), None);
    }

    #[test]
    fn single_node_is_always_selected() {
        let nodes = vec!["node-a".to_owned()];
        for _ in 0..10 {
            assert_eq!(RandomPlacement.select_node(&nodes).as_deref(), Some("node-a"));
        }
    }

    #[test]
    fn selection_stays_within_candidates_and_spreads() {
        let nodes = vec!["node-a".to_owned(), "node-b".to_owned(), "node-c".to_owned()];
        let mut seen = HashSet::new();
        for _ in 0..300 {
            let node = RandomPlacement.select_node(&nodes).unwrap();
            assert!(nodes.contains(&node));
            seen.insert(node);
        }
        assert_eq!(seen.len(), nodes.len());
    }
}
