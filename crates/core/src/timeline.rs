//! Fixed-timeline math for composition.
//!
//! The timeline is rigid: five scenes, each contributing a 6-second
//! segment, for a 30-second total. Clip N always occupies
//! `[(N-1)*6, N*6)`; voiceover tracks sit at the same offsets and the
//! music track spans the full duration at reduced volume.

use crate::script::SCENE_COUNT;

// ---------------------------------------------------------------------------
// Durations and volumes
// ---------------------------------------------------------------------------

/// Length of every scene segment.
pub const SCENE_DURATION_SECS: u32 = 6;

/// Total composed duration: [`SCENE_COUNT`] segments back to back.
pub const TIMELINE_DURATION_SECS: u32 = SCENE_COUNT as u32 * SCENE_DURATION_SECS;

/// Voiceover tracks play at full volume.
pub const VOICEOVER_VOLUME: f32 = 1.0;

/// Music sits under the narration.
pub const MUSIC_VOLUME: f32 = 0.1;

/// Timeline offset of scene `scene_number`'s segment. Scene numbers are
/// 1-based; values below 1 clamp to offset 0.
pub fn clip_offset_secs(scene_number: i32) -> u32 {
    (scene_number - 1).max(0) as u32 * SCENE_DURATION_SECS
}

// ---------------------------------------------------------------------------
// Audio overlay tracks
// ---------------------------------------------------------------------------

/// One audio track placed on the composed timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub url: String,
    pub start_secs: u32,
    pub duration_secs: u32,
    pub volume: f32,
}

/// Build voiceover overlay tracks from `(scene_number, voiceover_url)`
/// pairs. Scenes with a missing or empty reference are skipped without
/// shifting the remaining tracks: scene N's narration always starts at
/// `(N-1)*6` even when an earlier scene's synthesis was degraded.
pub fn voiceover_tracks(entries: &[(i32, Option<&str>)]) -> Vec<AudioTrack> {
    let mut tracks: Vec<AudioTrack> = entries
        .iter()
        .filter_map(|(scene_number, url)| match url {
            Some(u) if !u.is_empty() => Some(AudioTrack {
                url: (*u).to_string(),
                start_secs: clip_offset_secs(*scene_number),
                duration_secs: SCENE_DURATION_SECS,
                volume: VOICEOVER_VOLUME,
            }),
            _ => None,
        })
        .collect();
    tracks.sort_by_key(|t| t.start_secs);
    tracks
}

/// Build the background-music track spanning the whole timeline.
pub fn music_track(url: &str) -> AudioTrack {
    AudioTrack {
        url: url.to_string(),
        start_secs: 0,
        duration_secs: TIMELINE_DURATION_SECS,
        volume: MUSIC_VOLUME,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Offsets --

    #[test]
    fn offsets_step_by_segment_duration() {
        assert_eq!(clip_offset_secs(1), 0);
        assert_eq!(clip_offset_secs(2), 6);
        assert_eq!(clip_offset_secs(3), 12);
        assert_eq!(clip_offset_secs(4), 18);
        assert_eq!(clip_offset_secs(5), 24);
    }

    #[test]
    fn total_duration_is_thirty_seconds() {
        assert_eq!(TIMELINE_DURATION_SECS, 30);
        assert_eq!(clip_offset_secs(5) + SCENE_DURATION_SECS, TIMELINE_DURATION_SECS);
    }

    // -- Voiceover tracks --

    #[test]
    fn voiceover_tracks_keep_scene_offsets() {
        let tracks = voiceover_tracks(&[
            (1, Some("https://a/1.mp3")),
            (2, Some("https://a/2.mp3")),
            (3, Some("https://a/3.mp3")),
        ]);
        let offsets: Vec<u32> = tracks.iter().map(|t| t.start_secs).collect();
        assert_eq!(offsets, vec![0, 6, 12]);
        assert!(tracks.iter().all(|t| t.duration_secs == SCENE_DURATION_SECS));
        assert!(tracks.iter().all(|t| t.volume == VOICEOVER_VOLUME));
    }

    #[test]
    fn missing_voiceover_does_not_shift_later_tracks() {
        let tracks = voiceover_tracks(&[
            (1, Some("https://a/1.mp3")),
            (2, None),
            (3, Some("https://a/3.mp3")),
        ]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].start_secs, 12);
    }

    #[test]
    fn empty_reference_is_treated_as_missing() {
        let tracks = voiceover_tracks(&[(1, Some("")), (2, Some("https://a/2.mp3"))]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].start_secs, 6);
    }

    #[test]
    fn unsorted_input_yields_sorted_tracks() {
        let tracks = voiceover_tracks(&[
            (4, Some("https://a/4.mp3")),
            (1, Some("https://a/1.mp3")),
        ]);
        assert_eq!(tracks[0].start_secs, 0);
        assert_eq!(tracks[1].start_secs, 18);
    }

    // -- Music track --

    #[test]
    fn music_spans_full_timeline_at_low_volume() {
        let track = music_track("https://a/music.mp3");
        assert_eq!(track.start_secs, 0);
        assert_eq!(track.duration_secs, TIMELINE_DURATION_SECS);
        assert_eq!(track.volume, MUSIC_VOLUME);
    }
}
