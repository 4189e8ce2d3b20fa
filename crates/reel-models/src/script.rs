//! Reel scripts and scenes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transition used when a scene does not name one.
pub const DEFAULT_TRANSITION: &str = "fade";

/// Target seconds of narration per scene.
pub const SECONDS_PER_SCENE: u32 = 8;

/// Minimum number of scenes in a script.
pub const MIN_SCENES: u32 = 3;

/// Number of scenes to request for a target duration.
pub fn scene_count_for(duration_seconds: u32) -> u32 {
    MIN_SCENES.max(duration_seconds / SECONDS_PER_SCENE)
}

/// One scene of a reel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scene {
    /// 1-based position; matches the scene's audio and image file index
    pub order: u32,

    /// Narration text
    #[serde(rename = "text")]
    pub narration_text: String,

    /// Visual description (always English)
    #[serde(rename = "visual_prompt")]
    pub visual_description: String,

    /// Duration in seconds (> 0)
    #[serde(rename = "duration")]
    pub duration_seconds: f64,

    #[serde(rename = "transition")]
    pub transition_kind: String,
}

/// A complete reel script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Script {
    pub title: String,
    pub hook: String,
    pub scenes: Vec<Scene>,
    pub call_to_action: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub total_duration: f64,
}

/// Structural problems in a script.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("script has no scenes")]
    NoScenes,

    #[error("scene orders must be 1..={expected_len}, found {found} at position {position}")]
    NonContiguousOrder {
        expected_len: usize,
        position: usize,
        found: u32,
    },

    #[error("scene {order} has non-positive duration {duration}")]
    InvalidDuration { order: u32, duration: f64 },
}

impl Script {
    /// Check scene ordering and durations.
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.scenes.is_empty() {
            return Err(ScriptError::NoScenes);
        }
        for (position, scene) in self.scenes.iter().enumerate() {
            if scene.order as usize != position + 1 {
                return Err(ScriptError::NonContiguousOrder {
                    expected_len: self.scenes.len(),
                    position,
                    found: scene.order,
                });
            }
            if !(scene.duration_seconds > 0.0) {
                return Err(ScriptError::InvalidDuration {
                    order: scene.order,
                    duration: scene.duration_seconds,
                });
            }
        }
        Ok(())
    }

    /// Per-scene durations in scene order.
    pub fn scene_durations(&self) -> Vec<f64> {
        self.scenes.iter().map(|s| s.duration_seconds).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(order: u32, duration: f64) -> Scene {
        Scene {
            order,
            narration_text: format!("scene {}", order),
            visual_description: "a city at night".to_string(),
            duration_seconds: duration,
            transition_kind: DEFAULT_TRANSITION.to_string(),
        }
    }

    fn script(scenes: Vec<Scene>) -> Script {
        Script {
            title: "t".to_string(),
            hook: "h".to_string(),
            scenes,
            call_to_action: "follow".to_string(),
            hashtags: vec![],
            total_duration: 30.0,
        }
    }

    #[test]
    fn test_scene_count() {
        assert_eq!(scene_count_for(30), 3);
        assert_eq!(scene_count_for(15), 3);
        assert_eq!(scene_count_for(24), 3);
        assert_eq!(scene_count_for(40), 5);
        assert_eq!(scene_count_for(60), 7);
    }

    #[test]
    fn test_validate_ok() {
        let s = script(vec![scene(1, 8.0), scene(2, 8.0), scene(3, 8.0)]);
        assert!(s.validate().is_ok());
        assert_eq!(s.scene_durations(), vec![8.0, 8.0, 8.0]);
    }

    #[test]
    fn test_validate_gap_in_orders() {
        let s = script(vec![scene(1, 8.0), scene(3, 8.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScriptError::NonContiguousOrder { found: 3, .. })
        ));
    }

    #[test]
    fn test_validate_empty_and_zero_duration() {
        assert_eq!(script(vec![]).validate(), Err(ScriptError::NoScenes));
        assert!(matches!(
            script(vec![scene(1, 0.0)]).validate(),
            Err(ScriptError::InvalidDuration { order: 1, .. })
        ));
    }

    #[test]
    fn test_scene_wire_names() {
        let json = serde_json::to_value(scene(1, 8.0)).unwrap();
        assert_eq!(json["text"], "scene 1");
        assert_eq!(json["visual_prompt"], "a city at night");
        assert_eq!(json["duration"], 8.0);
        assert_eq!(json["transition"], "fade");
    }
}
