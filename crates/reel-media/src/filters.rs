//! FFmpeg filter graph definitions.

use std::path::Path;

use reel_models::encoding::{OUTPUT_FPS, OUTPUT_HEIGHT, OUTPUT_WIDTH};

/// Zoom increment per frame.
pub const ZOOM_STEP: f64 = 0.0015;
/// Maximum zoom factor.
pub const ZOOM_CAP: f64 = 1.3;

/// Burned-in caption style (ASS `force_style`).
pub const SUBTITLE_FORCE_STYLE: &str = concat!(
    "FontName=Arial,FontSize=22,Bold=1,",
    "PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BackColour=&H80000000,",
    "Outline=3,Shadow=2,Alignment=2,MarginV=80"
);

/// Background music bed at 20% mixed under the narration.
pub const MUSIC_MIX_FILTER: &str = concat!(
    "[1:a]volume=0.2[music];",
    "[0:a][music]amix=inputs=2:duration=first:dropout_transition=3[aout]"
);

/// Label of the assembled slideshow stream.
pub const SLIDESHOW_LABEL: &str = "[vout]";

/// Label of the mixed audio stream.
pub const MIXED_AUDIO_LABEL: &str = "[aout]";

/// Frame count for a clip of `duration` seconds (truncated).
pub fn frame_count(duration: f64) -> u32 {
    (duration * OUTPUT_FPS as f64) as u32
}

/// Ken Burns sub-graph for input `index`.
///
/// Upsamples to twice the output size so the zoom stays sharp, zooms towards
/// the centre up to the cap and emits `[v{index}]` at the output resolution.
pub fn ken_burns_segment(index: usize, duration: f64) -> String {
    format!(
        "[{i}:v]scale={uw}:{uh},zoompan=z='min(zoom+{step},{cap})':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d={d}:s={w}x{h}:fps={fps},setsar=1[v{i}]",
        i = index,
        uw = OUTPUT_WIDTH * 2,
        uh = OUTPUT_HEIGHT * 2,
        step = ZOOM_STEP,
        cap = ZOOM_CAP,
        d = frame_count(duration),
        w = OUTPUT_WIDTH,
        h = OUTPUT_HEIGHT,
        fps = OUTPUT_FPS,
    )
}

/// Full slideshow graph: one Ken Burns segment per duration, concatenated in order.
pub fn slideshow_filter(durations: &[f64]) -> String {
    let segments: Vec<String> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| ken_burns_segment(i, *d))
        .collect();
    let labels: String = (0..durations.len()).map(|i| format!("[v{}]", i)).collect();

    format!(
        "{};{}concat=n={}:v=1:a=0{}",
        segments.join(";"),
        labels,
        durations.len(),
        SLIDESHOW_LABEL
    )
}

/// Escape a path for use inside a filter argument.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

/// Subtitle burn-in filter for an SRT file.
pub fn subtitle_filter(srt: &Path) -> String {
    format!(
        "subtitles={}:force_style='{}'",
        escape_filter_path(srt),
        SUBTITLE_FORCE_STYLE
    )
}

/// Scale into the output frame preserving aspect ratio, then pad to centre.
pub fn delivery_scale_pad_filter() -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = OUTPUT_WIDTH,
        h = OUTPUT_HEIGHT
    )
}
