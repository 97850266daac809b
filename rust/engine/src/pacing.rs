use std::f64::consts::PI;

/// Length of the pacing window in seconds (30 minutes). The engine
/// always uses this default; per-game periods are not supported.
pub const PACE_PERIOD: f64 = 30.0 * 60.0;

/// Maps elapsed seconds since game creation into a decaying scalar in
/// [0, 1] that tunes how strongly generated cards are biased toward
/// the reference card.
///
/// The curve is the descending half of a sine wave: `pace(0) == 1`,
/// `pace(PACE_PERIOD) == 0`, monotonically decreasing in between.
/// Elapsed times outside the window are clamped.
pub fn pace(elapsed: f64) -> f64 {
    let t = (elapsed / PACE_PERIOD).clamp(0.0, 1.0);
    0.5 * (PI * (t + 0.5)).sin() + 0.5
}
