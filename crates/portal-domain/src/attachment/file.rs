//! File metadata helpers: kind detection, size formatting, labels and the
//! reference documents an attachment can be filed against.

use serde::{Deserialize, Serialize};

/// Documents an attachment can be attached to, keyed by short name.
pub const REFERENCE_DOCUMENTS: &[(&str, &str)] = &[
    ("BSKY", "BSKY - Design - colour exploration"),
    ("Research", "Preliminary research"),
    ("Documentation", "System documentation"),
];

/// Title of a reference document.
pub fn reference_title(key: &str) -> Option<&'static str> {
    REFERENCE_DOCUMENTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, title)| *title)
}

/// Broad file category, derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Word,
    Excel,
    Image,
    Text,
    Other,
}

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::Pdf,
        FileKind::Word,
        FileKind::Excel,
        FileKind::Image,
        FileKind::Text,
        FileKind::Other,
    ];

    /// Classify by the text after the last `.` (case-insensitive).
    pub fn from_file_name(name: &str) -> Self {
        let extension = extension_of(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&extension.as_str()))
            .unwrap_or(FileKind::Other)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Pdf => &["pdf"],
            FileKind::Word => &["doc", "docx"],
            FileKind::Excel => &["xls", "xlsx", "csv"],
            FileKind::Image => &["jpg", "jpeg", "png", "gif", "bmp", "svg"],
            FileKind::Text => &["txt", "md", "json", "xml", "html", "css", "js"],
            FileKind::Other => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::Excel => "excel",
            FileKind::Image => "image",
            FileKind::Text => "text",
            FileKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lower-cased extension; empty when the name has no `.`.
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base 1024 with up to two decimals.
///
/// `0 → "0 Bytes"`, `1536 → "1.5 KB"`, `1048576 → "1 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", scaled);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Split a comma-separated label string, dropping blanks.
pub fn parse_labels(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("report.PDF", FileKind::Pdf)]
    #[case("notes.docx", FileKind::Word)]
    #[case("export.csv", FileKind::Excel)]
    #[case("logo.svg", FileKind::Image)]
    #[case("README.md", FileKind::Text)]
    #[case("archive.tar.gz", FileKind::Other)]
    #[case("Makefile", FileKind::Other)]
    fn test_file_kind(#[case] name: &str, #[case] expected: FileKind) {
        assert_eq!(FileKind::from_file_name(name), expected);
    }

    #[rstest]
    #[case(0, "0 Bytes")]
    #[case(500, "500 Bytes")]
    #[case(1024, "1 KB")]
    #[case(1536, "1.5 KB")]
    #[case(1_048_576, "1 MB")]
    #[case(2_621_440, "2.5 MB")]
    #[case(1_234_567, "1.18 MB")]
    #[case(5 * 1024 * 1024 * 1024 * 1024, "5120 GB")]
    fn test_format_file_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_file_size(bytes), expected);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            parse_labels(" design, ,colour ,final,"),
            vec!["design", "colour", "final"]
        );
        assert!(parse_labels("   ").is_empty());
    }

    #[test]
    fn test_reference_title() {
        assert_eq!(reference_title("Research"), Some("Preliminary research"));
        assert_eq!(reference_title("research"), None);
    }
}
