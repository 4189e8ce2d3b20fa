//! FFprobe duration probing.

use std::path::Path;
use tracing::warn;

/// Duration assumed when ffprobe output cannot be parsed.
pub const FALLBACK_DURATION_SECS: f64 = 30.0;

/// Arguments that make ffprobe print only the container duration.
pub fn duration_probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

/// Parse ffprobe's csv duration output, falling back to 30 seconds.
pub fn parse_duration_output(stdout: &str) -> f64 {
    match stdout.trim().parse::<f64>() {
        Ok(d) if d.is_finite() && d > 0.0 => d,
        _ => {
            warn!(
                output = stdout.trim(),
                "could not parse probed duration, using {}", FALLBACK_DURATION_SECS
            );
            FALLBACK_DURATION_SECS
        }
    }
}
