//! Per-capture change flags.

use timeline_core::CaptureSequence;

/// Flag, for every capture, whether its fingerprint differs from the capture
/// immediately before it.
///
/// The first capture has nothing to compare against and is always `false`.
/// The result has the same length as `captures`.
pub fn detect_changes(captures: &CaptureSequence) -> Vec<bool> {
    let slice = captures.as_slice();
    let mut flags = Vec::with_capacity(slice.len());
    flags.push(false);
    flags.extend(
        slice
            .windows(2)
            .map(|pair| pair[1].fingerprint != pair[0].fingerprint),
    );
    flags
}

/// Number of change events in a flag sequence.
pub fn count_changes(flags: &[bool]) -> usize {
    flags.iter().filter(|&&changed| changed).count()
}
