use std::collections::HashSet;

use super::{diamond_topology, index_of, line_topology};
use crate::topo::{DeviationOpts, MAX_LINK_COST, NodeId, Topology, TopologyIndex};

fn square_ring() -> (Topology, [NodeId; 4]) {
    // a - b
    // |   |
    // d - c
    let mut topo = Topology::new();
    let a = topo.add_node("a");
    let b = topo.add_node("b");
    let c = topo.add_node("c");
    let d = topo.add_node("d");
    topo.connect_bidir(a, b, 1).unwrap();
    topo.connect_bidir(b, c, 1).unwrap();
    topo.connect_bidir(c, d, 1).unwrap();
    topo.connect_bidir(d, a, 1).unwrap();
    topo.set_egresses([c]).unwrap();
    (topo, [a, b, c, d])
}

#[test]
fn line_distances_and_single_shortest_paths() {
    let (topo, [a, b, c]) = line_topology();
    let index = index_of(&topo);

    assert_eq!(index.distance(a, c), Some(2));
    assert_eq!(index.distance(c, a), Some(2));
    assert_eq!(index.distance(b, b), Some(0));
    assert_eq!(index.shortest_paths(a, c), &[vec![a, b, c]]);
    assert_eq!(index.shortest_paths(b, c), &[vec![b, c]]);
}

#[test]
fn same_node_yields_trivial_path() {
    let (topo, [_, _, c]) = line_topology();
    let index = index_of(&topo);
    assert_eq!(index.shortest_paths(c, c), &[vec![c]]);
    assert_eq!(index.deviation_paths(c, c), &[vec![c]]);
}

#[test]
fn diamond_enumerates_all_equal_cost_paths() {
    let (topo, [s, x, y, t]) = diamond_topology();
    let index = index_of(&topo);

    let paths: HashSet<Vec<NodeId>> = index.shortest_paths(s, t).iter().cloned().collect();
    assert_eq!(paths, HashSet::from([vec![s, x, t], vec![s, y, t]]));
    assert_eq!(index.distance(s, t), Some(2));
    // 相邻节点之间只有一条
    assert_eq!(index.shortest_paths(s, x), &[vec![s, x]]);
}

#[test]
fn weighted_links_change_the_shortest_path() {
    let mut topo = Topology::new();
    let a = topo.add_node("a");
    let b = topo.add_node("b");
    let c = topo.add_node("c");
    topo.connect_bidir(a, c, 5).unwrap();
    topo.connect_bidir(a, b, 1).unwrap();
    topo.connect_bidir(b, c, 1).unwrap();
    topo.set_egresses([c]).unwrap();

    let index = index_of(&topo);
    assert_eq!(index.distance(a, c), Some(2));
    assert_eq!(index.shortest_paths(a, c), &[vec![a, b, c]]);
    assert!(index.is_shortest(&topo, &[a, b, c]));
    assert!(!index.is_shortest(&topo, &[a, c]));
}

#[test]
fn directed_links_are_one_way() {
    let mut topo = Topology::new();
    let a = topo.add_node("a");
    let b = topo.add_node("b");
    topo.connect(a, b, 1).unwrap();
    topo.set_egresses([b]).unwrap();

    let index = index_of(&topo);
    assert_eq!(index.distance(a, b), Some(1));
    assert_eq!(index.distance(b, a), None);
    assert!(index.shortest_paths(b, a).is_empty());
}

#[test]
fn disconnected_pair_has_no_paths() {
    let mut topo = Topology::new();
    let a = topo.add_node("A");
    let b = topo.add_node("B");
    let c = topo.add_node("C");
    topo.connect_bidir(b, c, 1).unwrap();
    topo.set_egresses([c]).unwrap();

    let index = index_of(&topo);
    assert_eq!(index.distance(a, c), None);
    assert!(index.shortest_paths(a, c).is_empty());
    assert!(index.deviation_paths(a, c).is_empty());
    assert_eq!(index.shortest_paths(a, a), &[vec![a]]);
}

#[test]
fn deviation_disabled_returns_shortest_set() {
    let (topo, [a, b, c, _]) = square_ring();
    let index = index_of(&topo);
    assert!(!index.deviation_enabled());
    assert_eq!(index.deviation_paths(a, b), index.shortest_paths(a, b));
    assert_eq!(index.deviation_paths(a, c), index.shortest_paths(a, c));
}

#[test]
fn deviation_paths_are_strictly_longer_within_slack() {
    let (topo, [a, b, c, d]) = square_ring();
    let index = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(2),
            max_paths: 8,
        },
    );
    assert!(index.deviation_enabled());

    let detours = index.deviation_paths(a, b);
    assert_eq!(detours, &[vec![a, d, c, b]]);
    for path in detours {
        assert!(!index.is_shortest(&topo, path));
        assert!(topo.path_cost(path).unwrap() <= index.distance(a, b).unwrap() + 2);
    }
}

#[test]
fn deviation_falls_back_to_shortest_when_no_detour_fits() {
    let (topo, [a, b, _, _]) = square_ring();
    let index = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(1),
            max_paths: 8,
        },
    );
    // 唯一的绕行代价为 3，超过 1 + 1
    assert_eq!(index.deviation_paths(a, b), index.shortest_paths(a, b));

    // 树上没有任何绕行
    let (line, [la, _, lc]) = line_topology();
    let line_index = TopologyIndex::build(
        &line,
        &DeviationOpts {
            slack: Some(3),
            max_paths: 8,
        },
    );
    assert_eq!(line_index.deviation_paths(la, lc), line_index.shortest_paths(la, lc));
}

#[test]
fn diamond_has_no_strictly_longer_detour() {
    let (topo, [s, _, _, t]) = diamond_topology();
    let index = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(10),
            max_paths: 8,
        },
    );
    // 只有两条 2 跳的简单路径，回落到最短路
    assert_eq!(index.deviation_paths(s, t).len(), 2);
    assert!(index.deviation_paths(s, t).iter().all(|p| index.is_shortest(&topo, p)));
}

#[test]
fn deviation_enumeration_respects_cap() {
    let mut topo = Topology::new();
    let ids: Vec<NodeId> = ["a", "b", "c", "d"].iter().map(|l| topo.add_node(*l)).collect();
    for i in 0..ids.len() {
        for j in i + 1..ids.len() {
            topo.connect_bidir(ids[i], ids[j], 1).unwrap();
        }
    }
    topo.set_egresses([ids[1]]).unwrap();

    let capped = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(5),
            max_paths: 1,
        },
    );
    assert_eq!(capped.deviation_paths(ids[0], ids[1]).len(), 1);

    let full = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(5),
            max_paths: 64,
        },
    );
    // a-c-b, a-d-b, a-c-d-b, a-d-c-b
    let detours = full.deviation_paths(ids[0], ids[1]);
    assert_eq!(detours.len(), 4);
    assert!(detours.iter().all(|p| p[0] == ids[0] && p[p.len() - 1] == ids[1]));
    assert!(detours.iter().all(|p| !full.is_shortest(&topo, p)));
}

#[test]
fn huge_slack_saturates_instead_of_overflowing() {
    let (topo, [a, _, c]) = line_topology();
    let index = TopologyIndex::build(
        &topo,
        &DeviationOpts {
            slack: Some(u64::MAX),
            max_paths: 8,
        },
    );
    assert_eq!(index.deviation_paths(a, c), index.shortest_paths(a, c));

    let (ring, [ra, rb, _, _]) = square_ring();
    let ring_index = TopologyIndex::build(
        &ring,
        &DeviationOpts {
            slack: Some(u64::MAX),
            max_paths: 8,
        },
    );
    assert_eq!(ring_index.deviation_paths(ra, rb).len(), 1);
}

#[test]
fn link_cost_above_maximum_is_rejected() {
    let mut topo = Topology::new();
    let a = topo.add_node("a");
    let b = topo.add_node("b");
    let c = topo.add_node("c");

    let err = topo.connect_bidir(a, b, u64::MAX / 2 + 1).unwrap_err();
    assert!(err.is_configuration());
    assert!(topo.connect(a, b, MAX_LINK_COST + 1).is_err());
    assert_eq!(topo.edge_count(), 0);

    // 上限本身可用，长路径代价也不会溢出
    topo.connect_bidir(a, b, MAX_LINK_COST).unwrap();
    topo.connect_bidir(b, c, MAX_LINK_COST).unwrap();
    topo.set_egresses([c]).unwrap();
    let index = index_of(&topo);
    assert_eq!(index.distance(a, c), Some(2 * MAX_LINK_COST));
    assert_eq!(topo.path_cost(&[a, b, c]), Some(2 * MAX_LINK_COST));
    assert!(index.is_shortest(&topo, &[a, b, c]));
}
