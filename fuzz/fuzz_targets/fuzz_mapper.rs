#![no_main]

use libfuzzer_sys::fuzz_target;
use pathdex::index::{glob_match, hash_path, PathMap, PATH_HASH_SIZE};

fuzz_target!(|data: (&str, &str)| {
    let (path, text) = data;

    // Mapping and hashing must never panic and must stay in range
    let map = PathMap::new(path, '/');
    for fragment in map.iter() {
        assert!((fragment.hash() as usize) < PATH_HASH_SIZE);
        assert!(!fragment.text().contains('/'));
    }
    assert!((hash_path(path, '/') as usize) < PATH_HASH_SIZE);

    let _ = glob_match(path, text);
});
