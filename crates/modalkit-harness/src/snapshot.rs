#![forbid(unsafe_code)]

//! Text snapshots of a stack projection.
//!
//! One line per modal, bottom first:
//!
//! ```text
//!  0 z=1000  md         ·   Editor
//!  1 z=1010  sm         top Confirm  -> 0 warn "Unsaved changes"
//! ```
//!
//! Columns: position, layer index, size token, top marker, title (padded to
//! the widest title by display width), then annotations: the target position
//! of a confirmation and `no-esc` / `no-backdrop` for disabled triggers. Ids
//! are left out so snapshots do not depend on the id strategy.

use std::fmt::Write as _;
use std::path::PathBuf;

use modalkit_widgets::modal::{ModalContent, ModalDescriptor};
use unicode_width::UnicodeWidthStr;

/// Render `projection` as snapshot text. An empty projection is `"(empty)\n"`.
pub fn projection_text<C>(projection: &[ModalDescriptor<'_, C>]) -> String {
    if projection.is_empty() {
        return "(empty)\n".to_string();
    }

    let title_width = projection
        .iter()
        .map(|d| d.title().width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for d in projection {
        let marker = if d.is_top() { "top" } else { "·  " };
        let _ = write!(
            out,
            "{:>2} z={:<5} {:<10} {} {}",
            d.position(),
            d.layer_index(),
            d.size().as_str(),
            marker,
            d.title()
        );
        let pad = title_width - d.title().width();
        out.extend(std::iter::repeat_n(' ', pad));

        if let ModalContent::Confirmation(prompt) = d.content() {
            let target = projection
                .iter()
                .find(|o| o.id() == prompt.target())
                .map_or_else(|| "?".to_string(), |o| o.position().to_string());
            let _ = write!(
                out,
                "  -> {target} {} {:?}",
                prompt.notice(),
                prompt.message()
            );
        }
        if d.disable_escape_close() {
            out.push_str("  no-esc");
        }
        if d.disable_backdrop_close() {
            out.push_str("  no-backdrop");
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }
    out
}

fn snapshot_path(manifest_dir: &str, name: &str) -> PathBuf {
    PathBuf::from(manifest_dir)
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

fn is_bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Backing function of [`assert_snapshot!`](crate::assert_snapshot).
///
/// # Panics
///
/// Panics when the stored snapshot differs and `BLESS` is not set, or when
/// a snapshot cannot be written.
pub fn check_snapshot(manifest_dir: &str, name: &str, actual: &str) {
    let path = snapshot_path(manifest_dir, name);
    let write = |path: &PathBuf| {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap_or_else(|e| {
                panic!("cannot create snapshot dir {}: {e}", dir.display())
            });
        }
        std::fs::write(path, actual)
            .unwrap_or_else(|e| panic!("cannot write snapshot {}: {e}", path.display()));
    };

    match std::fs::read_to_string(&path) {
        Ok(expected) if expected == actual => {}
        Ok(expected) => {
            if is_bless() {
                tracing::info!(snapshot = name, "snapshot updated");
                write(&path);
            } else {
                panic!(
                    "snapshot '{name}' mismatch ({})\n--- expected\n{expected}--- actual\n{actual}\
                     (rerun with BLESS=1 to accept)",
                    path.display()
                );
            }
        }
        Err(_) => {
            tracing::info!(snapshot = name, "snapshot recorded");
            write(&path);
        }
    }
}

/// Hex digest of snapshot text, used to compare frames cheaply.
pub fn digest(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}
