//! Output formatting for index lookups

use crate::index::build::EntryInfo;
use crate::index::{NodeId, NodeKind, PathIndex};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One resolved node, ready for printing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub path: String,
    pub kind: NodeKind,
    pub hash: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryInfo>,
}

impl NodeRecord {
    /// Resolve `id`; `None` if the handle is stale
    pub fn resolve(index: &PathIndex<EntryInfo>, id: NodeId, delimiter: char) -> Option<Self> {
        let node = index.node(id)?;
        Some(Self {
            path: index.compose_path(id, delimiter)?,
            kind: node.kind(),
            hash: node.hash(),
            entry: node.payload().copied(),
        })
    }
}

/// Resolve and sort `ids` by path
pub fn collect_records(index: &PathIndex<EntryInfo>, ids: &[NodeId], delimiter: char) -> Vec<NodeRecord> {
    let mut records: Vec<_> = ids
        .iter()
        .filter_map(|&id| NodeRecord::resolve(index, id, delimiter))
        .collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));
    records
}

/// Print records one per line, branches highlighted
pub fn print_records(records: &[NodeRecord], color: ColorChoice, long: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color);

    for record in records {
        if long {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(stdout, "{:6} {:3} ", record.kind.name(), record.hash)?;
            stdout.reset()?;
            match record.entry {
                Some(entry) => write!(stdout, "{:>10} ", entry.size)?,
                None => write!(stdout, "{:>10} ", "-")?,
            }
        }

        if record.kind == NodeKind::Branch {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
        }
        write!(stdout, "{}", record.path)?;
        stdout.reset()?;
        writeln!(stdout)?;
    }

    Ok(())
}

/// Print records as JSON lines
pub fn print_json(records: &[NodeRecord]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }
    Ok(())
}
