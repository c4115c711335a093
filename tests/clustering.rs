//! Community detection properties

use narrative_layout::cluster::{ClusterError, Edge, Louvain, Partition};
use pretty_assertions::assert_eq;

fn singletons(louvain: &Louvain) -> Partition {
    let nodes = louvain.nodes().to_vec();
    let communities = (0..nodes.len()).collect();
    Partition::new(nodes, communities)
}

fn graph(nodes: impl IntoIterator<Item = usize>, edges: &[(usize, usize, f64)]) -> Louvain {
    Louvain::new()
        .with_nodes(nodes)
        .with_edges(edges.iter().map(|&(a, b, w)| Edge::new(a, b, w)))
        .expect("Should accept edges")
}

/// Zachary-style toy: two dense clusters joined by one weak bridge
fn barbell() -> Louvain {
    graph(
        0..8,
        &[
            (0, 1, 1.0),
            (0, 2, 1.0),
            (0, 3, 1.0),
            (1, 2, 1.0),
            (1, 3, 1.0),
            (2, 3, 1.0),
            (4, 5, 1.0),
            (4, 6, 1.0),
            (4, 7, 1.0),
            (5, 6, 1.0),
            (5, 7, 1.0),
            (6, 7, 1.0),
            (3, 4, 0.5),
        ],
    )
}

#[test]
fn test_modularity_never_below_singletons() {
    let cases = vec![
        barbell(),
        graph(0..3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]),
        graph(0..5, &[(0, 1, 3.0), (1, 2, 0.5), (2, 3, 2.0), (3, 4, 1.0), (4, 0, 0.25)]),
        graph([10, 20, 30], &[(10, 20, 1.0), (30, 30, 2.0)]),
    ];
    for louvain in cases {
        let found = louvain.modularity(&louvain.run());
        let baseline = louvain.modularity(&singletons(&louvain));
        assert!(found >= baseline, "{} < {}", found, baseline);
    }
}

#[test]
fn test_barbell_splits_at_the_bridge() {
    let louvain = barbell();
    let partition = louvain.run();
    assert_eq!(partition.communities(), &[0, 0, 0, 0, 1, 1, 1, 1]);
    assert!(louvain.modularity(&partition) > 0.3);
}

#[test]
fn test_edgeless_nodes_stay_apart() {
    let partition = Louvain::new().with_nodes([7, 3, 9]).run();
    assert_eq!(partition.nodes(), &[7, 3, 9]);
    assert_eq!(partition.communities(), &[0, 1, 2]);

    let partition = graph(0..4, &[]).run();
    assert_eq!(partition.community_count(), 4);
}

#[test]
fn test_arbitrary_node_keys() {
    let louvain = graph([100, 42, 7, 8], &[(100, 42, 2.0), (7, 8, 2.0)]);
    let partition = louvain.run();
    assert_eq!(partition.community_of(100), partition.community_of(42));
    assert_eq!(partition.community_of(7), partition.community_of(8));
    assert_ne!(partition.community_of(100), partition.community_of(7));
    assert_eq!(partition.community_of(5), None);
}

#[test]
fn test_parallel_edges_add_up() {
    let merged = graph(0..3, &[(0, 1, 2.0), (1, 2, 1.0)]);
    let split = graph(0..3, &[(0, 1, 1.0), (1, 0, 1.0), (1, 2, 1.0)]);
    assert_eq!(merged.run(), split.run());
    assert_eq!(
        merged.modularity(&singletons(&merged)),
        split.modularity(&singletons(&split))
    );
}

#[test]
fn test_dendrogram_levels_refine_to_best() {
    let louvain = barbell();
    let dendrogram = louvain.dendrogram();
    assert!(!dendrogram.is_empty());

    let first = dendrogram.partition_at_level(0);
    let best = dendrogram.best_partition();
    assert!(first.community_count() >= best.community_count());
    assert_eq!(best, louvain.run());

    // Nodes sharing a community at level 0 share one at every later level
    for a in 0..8 {
        for b in 0..8 {
            if first.communities()[a] == first.communities()[b] {
                assert_eq!(best.communities()[a], best.communities()[b]);
            }
        }
    }
}

#[test]
fn test_initial_partition_seeds_first_level() {
    let louvain = barbell()
        .with_initial_partition([(0, 5), (1, 5), (2, 5), (3, 5)])
        .expect("Should accept hints");
    let partition = louvain.run();
    assert_eq!(partition.community_of(0), partition.community_of(3));
    assert_ne!(partition.community_of(0), partition.community_of(4));
}

#[test]
fn test_setup_errors() {
    let err = Louvain::new()
        .with_edges([Edge::new(0, 1, 1.0)])
        .unwrap_err();
    assert_eq!(err, ClusterError::MissingNodes);

    let err = Louvain::new()
        .with_nodes(0..2)
        .with_edges([Edge::new(0, 5, 1.0)])
        .unwrap_err();
    assert_eq!(err, ClusterError::UnknownNode { node: 5 });

    for weight in [0.0, -1.0, f64::INFINITY] {
        let err = Louvain::new()
            .with_nodes(0..2)
            .with_edges([Edge::new(0, 1, weight)])
            .unwrap_err();
        assert!(matches!(err, ClusterError::NonPositiveWeight { .. }));
    }

    let err = Louvain::new()
        .with_nodes(0..2)
        .with_initial_partition([(9, 0)])
        .unwrap_err();
    assert_eq!(err, ClusterError::UnknownNode { node: 9 });
}
