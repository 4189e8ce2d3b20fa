//! Caption timing and SubRip rendering.
//!
//! Each scene's narration is cut into groups of [`CHUNK_WORDS`] words and the
//! scene's duration is split evenly across its groups. A running clock
//! advances by the full scene duration for every scene, including scenes with
//! no words, so captions stay aligned with the slideshow.

use std::fmt::Write as _;

use reel_models::{CaptionChunk, Scene};

/// Words per caption chunk.
pub const CHUNK_WORDS: usize = 5;

/// Build time-coded caption chunks for an ordered scene sequence.
pub fn build_captions(scenes: &[Scene]) -> Vec<CaptionChunk> {
    let mut chunks = Vec::new();
    let mut clock = 0.0_f64;

    for scene in scenes {
        let scene_start = clock;
        let scene_end = scene_start + scene.duration_seconds;
        let words: Vec<&str> = scene.narration_text.split_whitespace().collect();
        let groups: Vec<&[&str]> = words.chunks(CHUNK_WORDS).collect();
        let n = groups.len();

        let boundary = |k: usize| {
            if k == n {
                scene_end
            } else {
                scene_start + scene.duration_seconds * k as f64 / n as f64
            }
        };

        for (i, group) in groups.iter().enumerate() {
            chunks.push(CaptionChunk {
                start_seconds: boundary(i),
                end_seconds: boundary(i + 1),
                text: group.join(" ").to_uppercase(),
            });
        }

        clock = scene_end;
    }

    chunks
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Render chunks as a SubRip document.
pub fn render_srt(chunks: &[CaptionChunk]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_timestamp(chunk.start_seconds),
            srt_timestamp(chunk.end_seconds),
            chunk.text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(order: u32, text: &str, duration: f64) -> Scene {
        Scene {
            order,
            narration_text: text.to_string(),
            visual_description: String::new(),
            duration_seconds: duration,
            transition_kind: "fade".to_string(),
        }
    }

    #[test]
    fn test_chunks_tile_scene() {
        let scenes = vec![scene(
            1,
            "one two three four five six seven eight nine ten eleven",
            9.0,
        )];
        let chunks = build_captions(&scenes);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "ONE TWO THREE FOUR FIVE");
        assert_eq!(chunks[2].text, "ELEVEN");
        assert_eq!(chunks[0].start_seconds, 0.0);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
        }
        assert_eq!(chunks[2].end_seconds, 9.0);
    }

    #[test]
    fn test_text_reconstructs_words() {
        let text = "Coffee  was discovered by   a goat herder in Ethiopia long ago";
        let chunks = build_captions(&[scene(1, text, 7.0)]);
        let joined: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.text.split(' ').map(str::to_lowercase).collect::<Vec<_>>())
            .collect();
        let original: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        assert_eq!(joined, original);
    }

    #[test]
    fn test_next_scene_starts_at_cumulative_end() {
        let scenes = vec![
            scene(1, "a b c", 3.3),
            scene(2, "d e f g h i", 4.1),
        ];
        let chunks = build_captions(&scenes);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].end_seconds, 3.3);
        assert_eq!(chunks[1].start_seconds, 3.3);
        assert_eq!(chunks[2].end_seconds, 3.3 + 4.1);
    }

    #[test]
    fn test_empty_scene_still_consumes_time() {
        let scenes = vec![
            scene(1, "hello there", 5.0),
            scene(2, "   ", 4.0),
            scene(3, "goodbye", 6.0),
        ];
        let chunks = build_captions(&scenes);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].start_seconds, 9.0);
        assert_eq!(chunks[1].end_seconds, 15.0);
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(srt_timestamp(1.6), "00:00:01,600");
        assert_eq!(srt_timestamp(3725.042), "01:02:05,042");
    }

    #[test]
    fn test_render_srt() {
        let chunks = build_captions(&[scene(1, "hola mundo", 2.5)]);
        assert_eq!(
            render_srt(&chunks),
            "1\n00:00:00,000 --> 00:00:02,500\nHOLA MUNDO\n\n"
        );
        assert_eq!(render_srt(&[]), "");
    }
}
