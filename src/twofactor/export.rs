//! Client-local persistence affordances for backup codes.
//!
//! Codes are shown once; these helpers let the user keep them before the
//! display disappears. Nothing here talks to the server.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;

use crate::SERVICE_NAME;

/// Suggested filename for the downloaded code set.
pub const EXPORT_FILENAME: &str = "rentiva-backup-codes.txt";

/// Renders the code set as the text file offered for download.
pub fn backup_codes_file(codes: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{SERVICE_NAME} backup codes\n"));
    out.push_str(&format!("generated {}\n", Utc::now().format("%Y-%m-%d")));
    out.push_str("each code can be used once\n\n");
    for code in codes {
        out.push_str(code);
        out.push('\n');
    }
    out
}

/// Writes the rendered code file to disk.
pub fn write_backup_codes(path: &Path, codes: &[String]) -> io::Result<()> {
    fs::write(path, backup_codes_file(codes))
}

/// Picks a single code for the host UI to place on the clipboard.
pub fn code_for_clipboard(codes: &[String], index: usize) -> Option<&str> {
    codes.get(index).map(String::as_str)
}
