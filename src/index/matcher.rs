//! Matching of mapped search paths against index nodes.

use crate::index::mapper::PathMap;
use crate::index::tree::PathIndex;
use crate::index::types::{MatchFlags, NodeId};

/// Case-insensitive glob match of `text` against `pattern`.
///
/// `?` matches exactly one character and `*` matches any run of
/// characters, including none. On a mismatch the matcher backtracks to the
/// most recent `*` and lets it swallow one more character.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.is_ascii() && text.is_ascii() {
        return glob_slices(pattern.as_bytes(), text.as_bytes(), b'*', b'?', |a, b| {
            a.eq_ignore_ascii_case(&b)
        });
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_slices(&pattern, &text, '*', '?', |a, b| {
        a == b || a.to_lowercase().eq(b.to_lowercase())
    })
}

fn glob_slices<T: Copy + PartialEq>(
    pattern: &[T],
    text: &[T],
    star: T,
    any: T,
    eq: impl Fn(T, T) -> bool,
) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == star {
            // Try matching the empty run first.
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == any || eq(pattern[p], text[t])) {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            p = star_p + 1;
            t = star_t + 1;
            backtrack = Some((star_p, t));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == star)
}

/// Whether `node` is matched by `search`.
///
/// Search fragments are walked deepest first, in lock-step with the node's
/// ancestor chain. The first fragment is glob-matched against a leaf
/// candidate. Every other fragment is either a lone `*`, which matches any
/// single level, or must have the node's hash and equal its text ignoring
/// ASCII case. With [`MatchFlags::MATCH_FULL`] the chain has to end exactly
/// where the search path does.
pub fn match_directory<P>(
    index: &PathIndex<P>,
    node: NodeId,
    flags: MatchFlags,
    search: &PathMap<'_>,
) -> bool {
    let Some(candidate) = index.node(node) else {
        return false;
    };
    if flags.excludes(candidate.kind()) {
        return false;
    }

    let count = search.len();
    let mut current = node;
    for (i, fragment) in search.iter().enumerate() {
        let Some(current_node) = index.node(current) else {
            return false;
        };
        let text = index.pool().text(current_node.fragment_id());

        if i == 0 && current_node.is_leaf() {
            if !glob_match(fragment.text(), text) {
                return false;
            }
        } else if !fragment.is_wild() {
            // Hash first; text only when the buckets agree.
            if fragment.hash() != current_node.hash() {
                return false;
            }
            if !fragment.text().eq_ignore_ascii_case(text) {
                return false;
            }
        }

        if i + 1 == count {
            return !flags.match_full() || current_node.parent().is_none();
        }

        match current_node.parent() {
            Some(parent) => current = parent,
            None => return false,
        }
    }

    false
}
