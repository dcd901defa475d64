//! Kernel mount table (`/proc/self/mounts`) parsing.

use std::path::{Path, PathBuf};

use isivol_shared::errors::IsivolResult;

/// One line of the mount table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub target: PathBuf,
    pub fs_type: String,
}

impl MountEntry {
    /// NFS of any protocol version (`nfs`, `nfs4`).
    pub fn is_nfs(&self) -> bool {
        self.fs_type.starts_with("nfs")
    }
}

/// Read and parse a mount table file.
pub async fn read_mounts(path: &Path) -> IsivolResult<Vec<MountEntry>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_mounts(&contents))
}

/// Parse mount table contents.
///
/// Format: `<source> <target> <fstype> <options> <dump> <pass>`. Lines with
/// fewer than three fields are skipped.
pub fn parse_mounts(contents: &str) -> Vec<MountEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let source = fields.next()?;
            let target = fields.next()?;
            let fs_type = fields.next()?;
            Some(MountEntry {
                source: unescape(source),
                target: PathBuf::from(unescape(target)),
                fs_type: fs_type.to_string(),
            })
        })
        .collect()
}

/// Decode the octal escapes the kernel uses for whitespace and backslashes
/// (`\040`, `\011`, `\012`, `\134`).
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_triplet(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_triplet(digits: &[u8]) -> bool {
    digits.len() == 3 && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
