//! Composite score to vulnerability class

use crate::error::{CviError, Result};
use crate::index::ClassBand;

/// First band with `min <= score < max`; the final band also admits `max`.
///
/// Scores outside every band are reported, never clamped.
pub fn classify(score: f64, bands: &[ClassBand]) -> Result<&ClassBand> {
    let last = bands.len().saturating_sub(1);
    bands
        .iter()
        .enumerate()
        .find(|(position, band)| {
            score >= band.min && (score < band.max || (*position == last && score == band.max))
        })
        .map(|(_, band)| band)
        .ok_or(CviError::OutOfRange { score })
}
