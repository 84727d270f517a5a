//! Catalog building: filling a [`PathIndex`] from a directory tree or a
//! path listing.

use crate::index::tree::PathIndex;
use crate::index::types::IndexConfig;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use crate::utils::AppConfig;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Payload attached to every catalog leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EntryInfo {
    pub size: u64,
    /// Modification time in seconds since the epoch, 0 when unknown
    pub mtime: u64,
}

/// Where a catalog's paths came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Directory(PathBuf),
    List(PathBuf),
}

impl CatalogSource {
    pub fn path(&self) -> &Path {
        match self {
            CatalogSource::Directory(path) | CatalogSource::List(path) => path,
        }
    }
}

/// Options for building a catalog
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub delimiter: char,
    pub index: IndexConfig,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
    pub max_depth: Option<usize>,
    /// Suppress progress output
    pub silent: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CatalogOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            index: IndexConfig {
                allow_duplicate_leaves: config.allow_duplicate_leaves,
            },
            respect_gitignore: config.respect_gitignore,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
            silent: false,
        }
    }
}

/// A path index built from one source
#[derive(Debug)]
pub struct Catalog {
    pub index: PathIndex<EntryInfo>,
    pub source: CatalogSource,
    pub delimiter: char,
    /// Entries that could not be inserted (unreadable, non UTF-8)
    pub skipped: usize,
}

/// Build a catalog of every file under `root`
pub fn build_from_dir(root: &Path, options: &CatalogOptions) -> Result<Catalog> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let spinner = spinner(options.silent, "Discovering files...");

    let mut walker = WalkBuilder::new(&root);
    walker
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .max_depth(options.max_depth)
        .filter_entry(|entry| entry.file_name() != ".git");

    let mut index = PathIndex::with_config(options.index.clone());
    let mut skipped = 0;

    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "walk error");
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Some(rel_path) = entry
            .path()
            .strip_prefix(&root)
            .ok()
            .and_then(|rel| join_components(rel, options.delimiter))
        else {
            warn!(path = %entry.path().display(), "skipping path that is not valid UTF-8");
            skipped += 1;
            continue;
        };

        let info = entry
            .metadata()
            .map(|meta| EntryInfo {
                size: meta.len(),
                mtime: meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            })
            .unwrap_or_default();

        index.insert(&rel_path, options.delimiter, info);
        if let Some(ref spinner) = spinner {
            spinner.inc(1);
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Cataloged {} files", index.size()));
    }
    info!(root = %root.display(), paths = index.size(), nodes = index.node_count(), skipped, "catalog built from directory");

    Ok(Catalog {
        index,
        source: CatalogSource::Directory(root),
        delimiter: options.delimiter,
        skipped,
    })
}

/// Build a catalog from a listing file, one path per line
pub fn build_from_list(list: &Path, options: &CatalogOptions) -> Result<Catalog> {
    let file = File::open(list).with_context(|| format!("Failed to open listing {}", list.display()))?;
    let mtime = fs::metadata(list)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let spinner = spinner(options.silent, "Reading listing...");
    let mut index = PathIndex::with_config(options.index.clone());
    let inserted = insert_listing(&mut index, BufReader::new(file), options.delimiter, mtime)
        .with_context(|| format!("Failed to read listing {}", list.display()))?;

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Read {} entries", inserted));
    }
    info!(list = %list.display(), entries = inserted, paths = index.size(), "catalog built from listing");

    Ok(Catalog {
        index,
        source: CatalogSource::List(list.to_path_buf()),
        delimiter: options.delimiter,
        skipped: 0,
    })
}

/// Insert every entry of a listing into `index`.
///
/// Each line is a path, optionally followed by a tab and the entry size in
/// bytes. Blank lines and lines starting with `#` are ignored. Returns the
/// number of entries read.
pub fn insert_listing<R: BufRead>(
    index: &mut PathIndex<EntryInfo>,
    reader: R,
    delimiter: char,
    mtime: u64,
) -> Result<usize> {
    let mut inserted = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (path, size) = match line.split_once('\t') {
            Some((path, size)) => {
                let size = size
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("line {}: invalid size {:?}", line_no + 1, size))?;
                (path, size)
            }
            None => (line, 0),
        };

        if index.insert(path, delimiter, EntryInfo { size, mtime }).is_none() {
            debug!(line = line_no + 1, "listing entry has no path fragments");
            continue;
        }
        inserted += 1;
    }
    Ok(inserted)
}

/// Join the normal components of a relative path with `delimiter`
fn join_components(rel: &Path, delimiter: char) -> Option<String> {
    let mut joined = String::new();
    for component in rel.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        if !joined.is_empty() {
            joined.push(delimiter);
        }
        joined.push_str(part.to_str()?);
    }
    (!joined.is_empty()).then_some(joined)
}

fn spinner(silent: bool, message: &'static str) -> Option<ProgressBar> {
    if silent {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {pos}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::MatchFlags;
    use std::io::Cursor;

    fn silent() -> CatalogOptions {
        CatalogOptions {
            silent: true,
            ..CatalogOptions::default()
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("pathdex_build_tests")
            .join(format!("{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_insert_listing() {
        let listing = "# lumps\nPLAYPAL\t10752\nmaps/E1M1/THINGS\t1380\n\nmaps/E1M1/LINEDEFS\n";
        let mut index = PathIndex::new();
        let count = insert_listing(&mut index, Cursor::new(listing), '/', 7).unwrap();

        assert_eq!(count, 3);
        assert_eq!(index.size(), 3);
        let things = index.find(MatchFlags::new(), "e1m1/things", '/').unwrap();
        assert_eq!(index.payload(things), Some(&EntryInfo { size: 1380, mtime: 7 }));
        let linedefs = index.find(MatchFlags::new(), "LINEDEFS", '/').unwrap();
        assert_eq!(index.payload(linedefs).unwrap().size, 0);
    }

    #[test]
    fn test_insert_listing_rejects_bad_size() {
        let mut index = PathIndex::new();
        let err = insert_listing(&mut index, Cursor::new("a/b\tlots\n"), '/', 0).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_insert_listing_skips_delimiter_only_lines() {
        let mut index = PathIndex::new();
        let count = insert_listing(&mut index, Cursor::new("///\nok\n"), '/', 0).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_join_components() {
        assert_eq!(
            join_components(Path::new("textures/doors/metal1.png"), '/').unwrap(),
            "textures/doors/metal1.png"
        );
        assert_eq!(join_components(Path::new("a/b"), ':').unwrap(), "a:b");
        assert!(join_components(Path::new(""), '/').is_none());
    }

    #[test]
    fn test_build_from_dir() {
        let dir = temp_dir("dir");
        fs::create_dir_all(dir.join("textures/doors")).unwrap();
        fs::write(dir.join("textures/doors/metal1.png"), b"1234").unwrap();
        fs::write(dir.join("readme.txt"), b"hi").unwrap();

        let catalog = build_from_dir(&dir, &silent()).unwrap();
        assert_eq!(catalog.index.size(), 2);
        assert!(matches!(catalog.source, CatalogSource::Directory(_)));

        let metal = catalog
            .index
            .find(MatchFlags(MatchFlags::MATCH_FULL), "textures/doors/metal1.png", '/')
            .unwrap();
        assert_eq!(catalog.index.payload(metal).unwrap().size, 4);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_from_dir_rejects_file() {
        let dir = temp_dir("file");
        let file = dir.join("plain.txt");
        fs::write(&file, b"x").unwrap();
        assert!(build_from_dir(&file, &silent()).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_from_list() {
        let dir = temp_dir("list");
        let list = dir.join("doom.lst");
        fs::write(&list, "PLAYPAL\t10752\nCOLORMAP\t8704\n").unwrap();

        let catalog = build_from_list(&list, &silent()).unwrap();
        assert_eq!(catalog.index.size(), 2);
        assert_eq!(catalog.source.path(), list.as_path());

        let _ = fs::remove_dir_all(&dir);
    }
}
