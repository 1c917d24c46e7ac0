#![forbid(unsafe_code)]

//! Test harness for modalkit.
//!
//! - [`RecordingRenderer`] keeps every frame the session renders.
//! - [`projection_text`] turns a projection into a stable, line-per-modal
//!   text form suitable for snapshot comparison.
//! - [`assert_snapshot!`] compares text against `tests/snapshots/<name>.snap`.
//!
//! Run `BLESS=1 cargo test --package modalkit-harness` to create/update
//! snapshots.

pub mod recording;
pub mod snapshot;

pub use recording::{Frame, RecordingRenderer};
pub use snapshot::{check_snapshot, digest, projection_text};

/// Compare `$text` against the stored snapshot `$name`.
///
/// A missing snapshot is recorded and the assertion passes. A mismatch fails
/// unless `BLESS=1` is set, in which case the snapshot is rewritten.
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $text:expr) => {
        $crate::check_snapshot(env!("CARGO_MANIFEST_DIR"), $name, &$text)
    };
}
