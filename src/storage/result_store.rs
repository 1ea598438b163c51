//! Line-oriented result persistence.
//!
//! The result file holds one record per scanned port:
//!
//! ```text
//! Testing port 22... OPEN
//! Testing port 23... REFUSED
//! Testing port 24... BLOCKED
//! ```
//!
//! Loading is best-effort: lines that cannot be parsed are skipped so a
//! damaged file never blocks a resume. Saving always rewrites the whole file
//! through a temporary sibling and a rename.

use crate::error::{StoreError, StoreResult};
use crate::types::{Classification, Port, PortRange};
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const RECORD_PREFIX: &str = "Testing port ";
const RECORD_SEPARATOR: &str = "...";

/// Render one record as a result-file line, without the trailing newline.
pub fn format_record(port: Port, classification: &Classification) -> String {
    format!("{}{}{} {}", RECORD_PREFIX, port, RECORD_SEPARATOR, classification)
}

/// Parse one result-file line. Returns `None` for anything malformed.
pub fn parse_record(line: &str) -> Option<(Port, Classification)> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix(RECORD_PREFIX)?;
    let (port, classification) = rest.split_once(RECORD_SEPARATOR)?;
    let port: Port = port.trim().parse().ok()?;
    let classification: Classification = classification.trim().parse().ok()?;
    Some((port, classification))
}

/// Ordered mapping from port to classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStore {
    records: BTreeMap<Port, Classification>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from `path`.
    ///
    /// A missing file yields an empty store. Malformed lines, including ones
    /// that are not valid UTF-8, are skipped.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no previous results");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut store = Self::new();
        let mut skipped = 0usize;
        for line in bytes.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match std::str::from_utf8(line).ok().and_then(parse_record) {
                Some((port, classification)) => {
                    store.insert(port, classification);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(path = %path.display(), skipped, "skipped malformed result lines");
        }
        Ok(store)
    }

    /// Render every record in ascending port order, one per line.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.records.len() * 28);
        for (port, classification) in &self.records {
            out.push_str(&format_record(*port, classification));
            out.push('\n');
        }
        out
    }

    /// Rewrite `path` with the full contents of the store.
    ///
    /// The new content is written and synced to a `.tmp` sibling first, then
    /// renamed over the destination, so readers see either the old file or
    /// the complete new one.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let tmp = temp_path(path);
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::create(&tmp).map_err(write_err)?;
        file.write_all(self.render().as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }

        tracing::debug!(path = %path.display(), records = self.records.len(), "results flushed");
        Ok(())
    }

    /// Record a classification, returning the previous one for that port.
    pub fn insert(&mut self, port: Port, classification: Classification) -> Option<Classification> {
        self.records.insert(port, classification)
    }

    /// Classification stored for `port`.
    pub fn get(&self, port: Port) -> Option<&Classification> {
        self.records.get(&port)
    }

    /// Whether `port` has already been classified.
    pub fn contains(&self, port: Port) -> bool {
        self.records.contains_key(&port)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of stored records that fall inside `range`.
    pub fn count_in(&self, range: PortRange) -> usize {
        self.records
            .range(range.start()..=range.end())
            .count()
    }

    /// Iterate records in ascending port order.
    pub fn iter(&self) -> impl Iterator<Item = (Port, &Classification)> {
        self.records.iter().map(|(port, c)| (*port, c))
    }

    /// Count records per classification family (`OPEN`, `REFUSED`, ...).
    pub fn tally(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for classification in self.records.values() {
            *counts.entry(classification.family()).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<(Port, Classification)> for ResultStore {
    fn from_iter<I: IntoIterator<Item = (Port, Classification)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("results"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    fn sample() -> ResultStore {
        [
            (port(443), Classification::Open),
            (port(22), Classification::Refused),
            (port(8080), Classification::Blocked),
            (port(25), Classification::ErrorCode(54)),
            (port(9), Classification::error("ConnectionReset", "reset by peer")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(port(80), &Classification::Open),
            "Testing port 80... OPEN"
        );
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(
            parse_record("Testing port 80... OPEN\n"),
            Some((port(80), Classification::Open))
        );
        assert_eq!(
            parse_record("Testing port  7 ...   ERROR-54\r\n"),
            Some((port(7), Classification::ErrorCode(54)))
        );
        assert_eq!(parse_record("Testing port 0... OPEN"), None);
        assert_eq!(parse_record("Testing port x... OPEN"), None);
        assert_eq!(parse_record("Testing port 80 OPEN"), None);
        assert_eq!(parse_record("Testing port 80... MAYBE"), None);
        assert_eq!(parse_record("Port 80... OPEN"), None);
    }

    #[test]
    fn test_parse_record_keeps_dots_in_message() {
        assert_eq!(
            parse_record("Testing port 5... ERROR-Other:wait... then fail"),
            Some((port(5), Classification::error("Other", "wait... then fail")))
        );
    }

    #[test]
    fn test_render_is_ascending() {
        let rendered = sample().render();
        let ports: Vec<u16> = rendered
            .lines()
            .map(|l| parse_record(l).unwrap().0.as_u16())
            .collect();
        assert_eq!(ports, vec![9, 22, 25, 443, 8080]);
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan_results.txt");

        let store = sample();
        store.save(&path).unwrap();
        let loaded = ResultStore::load(&path).unwrap();

        assert_eq!(loaded, store);
        assert!(!dir.path().join("scan_results.txt.tmp").exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(&path, "Testing port 1... OPEN\nold junk\n".repeat(100)).unwrap();

        let mut store = ResultStore::new();
        store.insert(port(2), Classification::Refused);
        store.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Testing port 2... REFUSED\n");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::load(dir.path().join("absent.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_skips_corrupt_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        let mut content = b"Testing port 1... OPEN\n".to_vec();
        content.extend_from_slice(b"garbage line\n");
        content.extend_from_slice(b"Testing port 2... REFUSED\n");
        content.extend_from_slice(b"Testing port \xff\xfe... OPEN\n");
        content.extend_from_slice(b"\n");
        content.extend_from_slice(b"Testing port 3... BLOCKED\n");
        content.extend_from_slice(b"Testing port 4... BLO");
        fs::write(&path, content).unwrap();

        let store = ResultStore::load(&path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(port(1)), Some(&Classification::Open));
        assert_eq!(store.get(port(2)), Some(&Classification::Refused));
        assert_eq!(store.get(port(3)), Some(&Classification::Blocked));
        assert!(!store.contains(port(4)));
    }

    #[test]
    fn test_load_unreadable_path_is_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let result = ResultStore::load(dir.path());
        assert!(matches!(result, Err(StoreError::Read { .. })));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.txt");
        assert!(matches!(
            sample().save(&path),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn test_awkward_error_labels_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan_results.txt");

        let store: ResultStore = [
            (port(7), Classification::error("", "boom")),
            (port(8), Classification::error("a b", "x... y: z")),
            (port(9), Classification::error("42", "")),
            (port(10), Classification::error(" \n ", "")),
            (port(11), Classification::error("Other", "ends with...")),
        ]
        .into_iter()
        .collect();
        store.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Testing port 7... ERROR-Unknown:boom\n"));

        let loaded = ResultStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_count_in_and_tally() {
        let store = sample();
        let range: PortRange = "1-100".parse().unwrap();
        assert_eq!(store.count_in(range), 3);

        let tally = store.tally();
        assert_eq!(tally.get("OPEN"), Some(&1));
        assert_eq!(tally.get("REFUSED"), Some(&1));
        assert_eq!(tally.get("BLOCKED"), Some(&1));
        assert_eq!(tally.get("ERROR"), Some(&2));
    }
}
