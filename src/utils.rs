// ABOUTME: Utility functions for the upgrade deck generator
// ABOUTME: Provides output naming, directory validation and XML escaping helpers

use crate::errors::{DeckError, Result};
use chrono::{DateTime, TimeZone};
use std::borrow::Cow;
use std::fmt::Display;
use std::path::Path;

/// Timestamp format used in output file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Build `<prefix>_<YYYY-MM-DD_HHMMSS>.<extension>`
pub fn deck_file_name<Tz>(prefix: &str, at: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}_{}.{}",
        prefix,
        at.format(FILE_TIMESTAMP_FORMAT),
        extension
    )
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(DeckError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

/// Escape text for use in XML content or attribute values
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_deck_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            deck_file_name("Odoo_Database_Upgrade_Process", &at, "pptx"),
            "Odoo_Database_Upgrade_Process_2024-03-05_140709.pptx"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(deck_file_name("x", &at, "pptx"), "x_2023-12-31_235959.pptx");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(
            escape_xml("Click on the 'Backup' <button> & go"),
            "Click on the &apos;Backup&apos; &lt;button&gt; &amp; go"
        );
    }

    #[test]
    fn test_ensure_directory_exists() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_directory_exists(&file),
            Err(DeckError::ValidationError(_))
        ));
        assert!(ensure_parent_directory_exists(Path::new("bare.pptx")).is_ok());
    }
}
