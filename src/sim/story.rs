//! Narrative lines unlocked by gameplay milestones

use serde::{Deserialize, Serialize};

/// Story segment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryId {
    Intro,
    FirstStone,
    FirstDrop,
    Halfway,
    Success,
}

/// Gameplay milestone that unlocks a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryTrigger {
    Start,
    PickupFirst,
    DropFirst,
    Halfway,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySegment {
    pub id: StoryId,
    pub text: &'static str,
    pub trigger: StoryTrigger,
    pub shown: bool,
}

const SEGMENTS: [(StoryId, StoryTrigger, &str); 5] = [
    (
        StoryId::Intro,
        StoryTrigger::Start,
        "Once upon a time, a thirsty crow was flying around on a hot summer day, looking for water.",
    ),
    (
        StoryId::FirstStone,
        StoryTrigger::PickupFirst,
        "The crow found a pitcher with water, but the water level was too low to reach with its beak.",
    ),
    (
        StoryId::FirstDrop,
        StoryTrigger::DropFirst,
        "The clever crow had an idea! By dropping stones into the pitcher, the water level would rise.",
    ),
    (
        StoryId::Halfway,
        StoryTrigger::Halfway,
        "As more stones were added, the water level continued to rise. Keep going!",
    ),
    (
        StoryId::Success,
        StoryTrigger::Success,
        "Success! The water level has risen enough for the crow to drink. What a smart crow!",
    ),
];

/// The full story, nothing shown yet
pub fn story_segments() -> Vec<StorySegment> {
    SEGMENTS
        .iter()
        .map(|&(id, trigger, text)| StorySegment {
            id,
            text,
            trigger,
            shown: false,
        })
        .collect()
}

/// Mark every segment with `trigger` as shown
pub fn mark_triggered(segments: &mut [StorySegment], trigger: StoryTrigger) {
    for segment in segments.iter_mut().filter(|s| s.trigger == trigger) {
        segment.shown = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_starts_unshown() {
        let segments = story_segments();
        assert_eq!(segments.len(), 5);
        assert!(segments.iter().all(|s| !s.shown));
        assert_eq!(segments[0].id, StoryId::Intro);
    }

    #[test]
    fn test_mark_triggered_only_touches_matching() {
        let mut segments = story_segments();
        mark_triggered(&mut segments, StoryTrigger::Halfway);
        let shown: Vec<_> = segments.iter().filter(|s| s.shown).map(|s| s.id).collect();
        assert_eq!(shown, vec![StoryId::Halfway]);
    }
}
