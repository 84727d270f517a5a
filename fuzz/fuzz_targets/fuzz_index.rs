#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pathdex::index::{MatchFlags, PathIndex};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    paths: Vec<&'a str>,
    query: &'a str,
    flags: u16,
}

fuzz_target!(|input: Input<'_>| {
    let mut index = PathIndex::new();
    for (i, path) in input.paths.iter().enumerate() {
        if let Some(leaf) = index.insert(path, '/', i) {
            // Fragments are shared case-insensitively, so compare without case
            let composed = index.compose_path(leaf, '/').expect("live handle");
            assert!(composed.eq_ignore_ascii_case(path.trim_end_matches('/')));
        }
    }

    let _ = index.find(MatchFlags(input.flags & 0xf), input.query, '/');
    let _ = index.find_all(MatchFlags(input.flags & 0xf), input.query, '/');

    index.clear();
    assert_eq!(index.size(), 0);
});
