//! Behavioral tests for the path index as a whole: round trips, lookup
//! flags, bucket placement and clearing.

use pathdex::index::{hash_path, HashFilter, MatchFlags, NodeKind, PathIndex, PathMap, PATH_HASH_SIZE};
use std::ops::ControlFlow;

const SAMPLE_PATHS: &[&str] = &[
    "textures/doors/metal1",
    "textures/doors/metal2",
    "textures/walls/BRICK7",
    "flats/floor4_8",
    "sprites/troo/TROOA1",
    "sprites/troo/TROOB1",
    "fonts/normal12",
    "console/rend-tex-anisotropic",
    "/data/base/doom.wad",
    "a/b/c/d/e/f/g/h/i/j/k/l/deep.lmp",
];

fn sample_index() -> PathIndex<usize> {
    let mut index = PathIndex::new();
    for (i, path) in SAMPLE_PATHS.iter().enumerate() {
        index.insert(path, '/', i).unwrap();
    }
    index
}

#[test]
fn test_compose_round_trip() {
    let mut index = PathIndex::new();
    for path in SAMPLE_PATHS {
        let leaf = index.insert(path, '/', ()).unwrap();
        assert_eq!(index.compose_path(leaf, '/').unwrap(), *path);
    }
}

#[test]
fn test_round_trip_preserves_case() {
    let mut index = PathIndex::new();
    let leaf = index.insert("Sprites/TROO/TrooA1", '/', ()).unwrap();
    assert_eq!(index.compose_path(leaf, '/').unwrap(), "Sprites/TROO/TrooA1");
}

#[test]
fn test_idempotent_insert() {
    let mut index = PathIndex::new();
    let first = index.insert("x/y/z", '/', 1).unwrap();
    assert_eq!(index.size(), 1);
    let second = index.insert("x/y/z", '/', 2).unwrap();
    assert_eq!(first, second);
    assert_eq!(index.size(), 1);
    assert_eq!(index.payload(second), Some(&2));
}

#[test]
fn test_hash_determinism() {
    for path in SAMPLE_PATHS {
        let upper = path.to_uppercase();
        assert_eq!(hash_path(path, '/'), hash_path(path, '/'));
        assert_eq!(hash_path(path, '/'), hash_path(&upper, '/'));
        assert_eq!(hash_path(path, '/'), hash_path(&format!("{path}//"), '/'));
    }
}

#[test]
fn test_bucket_consistency() {
    let index = sample_index();
    let mut all = Vec::new();
    index.iterate::<(), _>(MatchFlags::new(), None, HashFilter::Any, |id, _| {
        all.push(id);
        ControlFlow::Continue(())
    });
    assert_eq!(all.len(), index.node_count());

    for id in all {
        let node = index.node(id).unwrap();
        let text = index.fragment(id).unwrap();
        assert_eq!(hash_path(text, '/'), node.hash());
        assert!((node.hash() as usize) < PATH_HASH_SIZE);

        let reachable = index.iterate(MatchFlags::new(), None, HashFilter::Bucket(node.hash()), |candidate, _| {
            if candidate == id {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(reachable.is_some(), "{text} not in its bucket");
    }
}

#[test]
fn test_wildcard_matching() {
    let mut index = PathIndex::new();
    let cat = index.insert("a/b/cat.txt", '/', ()).unwrap();
    let car = index.insert("a/b/car.txt", '/', ()).unwrap();

    let found = index.find(MatchFlags::new(), "a/b/ca*.txt", '/').unwrap();
    assert!(found == cat || found == car);
    assert_eq!(index.find(MatchFlags::new(), "a/b/cat.txt", '/'), Some(cat));
}

#[test]
fn test_full_match_flag() {
    let mut index = PathIndex::new();
    let z = index.insert("x/y/z", '/', ()).unwrap();

    assert_eq!(index.find(MatchFlags(MatchFlags::MATCH_FULL), "y/z", '/'), None);
    assert_eq!(index.find(MatchFlags::new(), "y/z", '/'), Some(z));
}

#[test]
fn test_exclusion_flags() {
    let mut index = PathIndex::new();
    index.insert("x/y/z", '/', ()).unwrap();
    assert_eq!(index.find(MatchFlags(MatchFlags::NO_LEAF), "x/y/z", '/'), None);
}

#[test]
fn test_clear_semantics() {
    let mut index = sample_index();
    let old: Vec<_> = SAMPLE_PATHS
        .iter()
        .map(|path| index.find(MatchFlags(MatchFlags::MATCH_FULL), path, '/').unwrap())
        .collect();

    index.clear();
    assert_eq!(index.size(), 0);
    for id in &old {
        assert!(index.node(*id).is_none());
        assert!(index.compose_path(*id, '/').is_none());
    }

    index.insert("textures/doors/metal1", '/', 0).unwrap();
    assert_eq!(index.size(), 1);
}

#[test]
fn test_rooted_and_relative_paths_are_distinct() {
    let mut index = PathIndex::new();
    let rooted = index.insert("/data/base", '/', ()).unwrap();
    let relative = index.insert("data/base", '/', ()).unwrap();
    assert_ne!(rooted, relative);
    assert_eq!(index.size(), 2);

    let full = MatchFlags(MatchFlags::MATCH_FULL);
    assert_eq!(index.find(full, "/data/base", '/'), Some(rooted));
    assert_eq!(index.find(full, "data/base", '/'), Some(relative));
}

#[test]
fn test_every_sample_path_found_by_full_match() {
    let index = sample_index();
    for (i, path) in SAMPLE_PATHS.iter().enumerate() {
        let id = index.find(MatchFlags(MatchFlags::MATCH_FULL), path, '/').unwrap();
        assert_eq!(index.payload(id), Some(&i), "{path}");
        assert_eq!(index.kind(id), Some(NodeKind::Leaf));
    }
}

#[test]
fn test_directories_compose_with_trailing_delimiter() {
    let index = sample_index();
    let troo = index.find(MatchFlags(MatchFlags::NO_LEAF), "sprites/troo", '/').unwrap();
    assert_eq!(index.compose_path(troo, '/').unwrap(), "sprites/troo/");
    assert_eq!(index.children(Some(troo), MatchFlags::new()).len(), 2);
}

#[test]
fn test_custom_search_over_mapped_path() {
    let index = sample_index();
    let map = PathMap::new("troo/*", '/');
    let even = index.search(MatchFlags::new(), &map, |index, id, flags, map| {
        pathdex::index::match_directory(index, id, flags, map) && index.payload(id).is_some_and(|v| v % 2 == 0)
    });
    let id = even.unwrap();
    assert_eq!(index.fragment(id), Some("TROOA1"));
}

#[test]
fn test_other_delimiters() {
    let mut index = PathIndex::new();
    let gravity = index.insert("game.rules.gravity", '.', 800).unwrap();
    assert_eq!(index.find(MatchFlags::new(), "rules.gravity", '.'), Some(gravity));
    assert_eq!(index.compose_path(gravity, '/').unwrap(), "game/rules/gravity");
}

#[test]
fn test_index_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PathIndex<String>>();
}
