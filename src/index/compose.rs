use crate::index::tree::PathIndex;
use crate::index::types::NodeId;

/// Rebuild the delimited path of `node`.
///
/// The ancestor chain is gathered and measured on one walk up the tree so
/// the string is allocated once; the text is then written root first.
/// Branch paths end with the delimiter, leaf paths do not. Returns `None`
/// for a stale handle.
pub fn compose_path<P>(index: &PathIndex<P>, node: NodeId, delimiter: char) -> Option<String> {
    let target = index.node(node)?;

    let mut chain = Vec::new();
    let mut len = 0;
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        let current = index.node(id)?;
        len += index.pool().text(current.fragment_id()).len();
        chain.push(current.fragment_id());
        cursor = current.parent();
    }
    len += (chain.len() - 1) * delimiter.len_utf8();
    if target.is_branch() {
        len += delimiter.len_utf8();
    }

    let mut path = String::with_capacity(len);
    for (i, &fragment) in chain.iter().rev().enumerate() {
        if i > 0 {
            path.push(delimiter);
        }
        path.push_str(index.pool().text(fragment));
    }
    if target.is_branch() {
        path.push(delimiter);
    }
    debug_assert_eq!(path.len(), len);
    Some(path)
}
