//! Table discovery: "open named table, get line sequence", independent of
//! physical packaging.

use crate::table::Table;
use crate::Result;
use ahash::AHashMap;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait TableSource {
    /// Physical members holding `table`, in read order. Empty if absent.
    fn members(&self, table: Table) -> Result<Vec<String>>;

    /// Open one member returned by [`TableSource::members`].
    fn open(&self, member: &str) -> Result<Box<dyn BufRead + '_>>;
}

/// A release extracted to a directory tree (e.g. `META/` and `NET/`).
///
/// Members are matched by file name and read in lexical path order; `.gz`
/// members are decompressed on the fly.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn open(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TableSource for DirectorySource {
    fn members(&self, table: Table) -> Result<Vec<String>> {
        Ok(self
            .files
            .iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| table.matches_member(name))
            })
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }

    fn open(&self, member: &str) -> Result<Box<dyn BufRead + '_>> {
        let file = File::open(member)?;
        if member.ends_with(".gz") {
            Ok(Box::new(BufReader::with_capacity(
                1 << 20,
                GzDecoder::new(file),
            )))
        } else {
            Ok(Box::new(BufReader::with_capacity(1 << 20, file)))
        }
    }
}

/// In-memory tables, one or more text parts per table.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    parts: AHashMap<Table, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a physical part to `table`. Parts are read in insertion order.
    pub fn with_part(mut self, table: Table, text: impl Into<String>) -> Self {
        self.parts.entry(table).or_default().push(text.into());
        self
    }

    fn part(&self, member: &str) -> Option<&str> {
        let (stem, index) = member.rsplit_once('#')?;
        let index: usize = index.parse().ok()?;
        let table = Table::ORDER.into_iter().find(|t| t.stem() == stem)?;
        self.parts.get(&table)?.get(index).map(String::as_str)
    }
}

impl TableSource for MemorySource {
    fn members(&self, table: Table) -> Result<Vec<String>> {
        let count = self.parts.get(&table).map_or(0, Vec::len);
        Ok((0..count).map(|i| format!("{}#{i}", table.stem())).collect())
    }

    fn open(&self, member: &str) -> Result<Box<dyn BufRead + '_>> {
        let text = self.part(member).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory member `{member}`"),
            )
        })?;
        Ok(Box::new(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TableLines;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn read_all(source: &dyn TableSource, member: &str) -> Vec<Vec<u8>> {
        let reader = source.open(member).expect("open");
        TableLines::new(reader)
            .collect::<std::io::Result<Vec<_>>>()
            .expect("read")
    }

    #[test]
    fn directory_source_finds_split_and_gzipped_members() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let meta = dir.path().join("META");
        std::fs::create_dir(&meta)?;
        std::fs::write(meta.join("MRRANK.RRF"), "1|SRC|RPT|N|\n")?;
        std::fs::write(meta.join("MRCONSO.RRF.aa"), "part-a\n")?;

        let member = File::create(meta.join("MRCONSO.RRF.ab.gz"))?;
        let mut gz = GzEncoder::new(member, Compression::default());
        gz.write_all(b"part-b\n")?;
        gz.finish()?;

        let source = DirectorySource::open(dir.path())?;
        let members = source.members(Table::Atom)?;
        assert_eq!(members.len(), 2);
        assert!(members[0].ends_with("MRCONSO.RRF.aa"));
        assert_eq!(read_all(&source, &members[0]), vec![b"part-a".to_vec()]);
        assert_eq!(read_all(&source, &members[1]), vec![b"part-b".to_vec()]);
        assert!(source.members(Table::Relation)?.is_empty());
        Ok(())
    }

    #[test]
    fn memory_source_serves_parts_in_order() {
        let source = MemorySource::new()
            .with_part(Table::Atom, "first\n")
            .with_part(Table::Atom, "second\n");
        let members = source.members(Table::Atom).expect("members");
        assert_eq!(members, vec!["MRCONSO.RRF#0", "MRCONSO.RRF#1"]);
        assert_eq!(read_all(&source, &members[1]), vec![b"second".to_vec()]);
        assert!(source.open("MRREL.RRF#0").is_err());
    }
}
