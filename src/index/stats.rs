use crate::index::build::{Catalog, CatalogSource, EntryInfo};
use crate::index::tree::PathIndex;
use crate::index::types::{HashFilter, MatchFlags, NodeKind, PATH_HASH_SIZE};
use serde::Serialize;
use std::ops::ControlFlow;

/// Occupancy of one kind's bucket table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketStats {
    pub nodes: usize,
    pub used_buckets: usize,
    pub largest_bucket: usize,
    /// Mean nodes per non-empty bucket
    pub mean_chain: f64,
}

impl BucketStats {
    fn from_sizes(sizes: impl Iterator<Item = usize>) -> Self {
        let mut stats = BucketStats::default();
        for size in sizes {
            stats.nodes += size;
            if size > 0 {
                stats.used_buckets += 1;
            }
            stats.largest_bucket = stats.largest_bucket.max(size);
        }
        if stats.used_buckets > 0 {
            stats.mean_chain = stats.nodes as f64 / stats.used_buckets as f64;
        }
        stats
    }
}

/// Summary of a path index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub paths: usize,
    pub nodes: usize,
    pub fragments: usize,
    pub max_depth: usize,
    pub branches: BucketStats,
    pub leaves: BucketStats,
}

/// Collect statistics for any index
pub fn index_stats<P>(index: &PathIndex<P>) -> IndexStats {
    let mut max_depth = 0;
    index.iterate::<(), _>(MatchFlags(MatchFlags::NO_BRANCH), None, HashFilter::Any, |_, node| {
        let mut depth = 1;
        let mut cursor = node.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = index.parent(parent);
        }
        max_depth = max_depth.max(depth);
        ControlFlow::Continue(())
    });

    IndexStats {
        paths: index.size(),
        nodes: index.node_count(),
        fragments: index.fragment_count(),
        max_depth,
        branches: BucketStats::from_sizes(index.bucket_sizes(NodeKind::Branch)),
        leaves: BucketStats::from_sizes(index.bucket_sizes(NodeKind::Leaf)),
    }
}

/// Total payload size of every leaf in a catalog
pub fn total_size(index: &PathIndex<EntryInfo>) -> u64 {
    let mut total = 0;
    index.iterate::<(), _>(MatchFlags(MatchFlags::NO_BRANCH), None, HashFilter::Any, |_, node| {
        total += node.payload().map_or(0, |info| info.size);
        ControlFlow::Continue(())
    });
    total
}

/// Display catalog statistics
pub fn show_stats(catalog: &Catalog) {
    let stats = index_stats(&catalog.index);

    println!("Catalog Statistics");
    println!("==================");
    println!();
    match &catalog.source {
        CatalogSource::Directory(root) => println!("Root path:        {}", root.display()),
        CatalogSource::List(list) => println!("Listing:          {}", list.display()),
    }
    println!("Delimiter:        {:?}", catalog.delimiter);
    println!("Paths:            {}", stats.paths);
    println!("Nodes:            {}", stats.nodes);
    println!("Fragments:        {}", stats.fragments);
    println!("Deepest path:     {}", stats.max_depth);
    println!("Total size:       {}", format_size(total_size(&catalog.index)));
    if catalog.skipped > 0 {
        println!("Skipped entries:  {}", catalog.skipped);
    }

    println!();
    println!("Buckets ({} per table):", PATH_HASH_SIZE);
    for (name, table) in [("branches", &stats.branches), ("leaves", &stats.leaves)] {
        println!(
            "  {:9} {} nodes in {} buckets, longest chain {}, mean {:.2}",
            name, table.nodes, table.used_buckets, table.largest_bucket, table.mean_chain
        );
    }
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_stats() {
        let mut index = PathIndex::new();
        index.insert("textures/doors/metal1", '/', EntryInfo { size: 10, mtime: 0 });
        index.insert("textures/doors/metal2", '/', EntryInfo { size: 5, mtime: 0 });
        index.insert("readme", '/', EntryInfo::default());

        let stats = index_stats(&index);
        assert_eq!(stats.paths, 3);
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.fragments, 5);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.branches.nodes, 2);
        assert_eq!(stats.leaves.nodes, 3);
        assert!(stats.leaves.used_buckets >= 1);
        assert_eq!(total_size(&index), 15);
    }

    #[test]
    fn test_empty_index_stats() {
        let index: PathIndex<EntryInfo> = PathIndex::new();
        let stats = index_stats(&index);
        assert_eq!(stats, IndexStats::default());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
