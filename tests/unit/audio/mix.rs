use super::*;

const RATE: u32 = 100;

fn constant_track(name: &str, secs: f64, value: f32, gain: f32) -> AudioTrack {
    let frames = (secs * f64::from(RATE)).round() as usize;
    let pcm = AudioPcm {
        sample_rate: RATE,
        channels: 2,
        interleaved_f32: vec![value; frames * 2],
    };
    AudioTrack::from_pcm(name, pcm, gain)
}

fn left_at(mix: &[f32], sec: f64) -> f32 {
    mix[(sec * f64::from(RATE)) as usize * 2]
}

#[test]
fn short_music_under_long_narration_is_not_looped() {
    let music = constant_track("music.mp3", 10.0, 1.0, 0.15);
    let voice = constant_track("tts_a.mp3", 25.0, 0.5, 1.0);
    let total = 25.5;

    let manifest = build_digest_manifest(total, RATE, &[(0.0, voice)], Some(&music)).unwrap();
    assert_eq!(manifest.total_samples, 2550);
    let mix = mix_manifest(&manifest);
    assert_eq!(mix.len(), 2550 * 2);

    // Music and narration overlap for the first 10 s.
    assert!((left_at(&mix, 5.0) - 0.65).abs() < 1e-6);
    // Narration alone afterwards; music never restarts.
    assert!((left_at(&mix, 12.0) - 0.5).abs() < 1e-6);
    assert!((left_at(&mix, 24.9) - 0.5).abs() < 1e-6);
    // The trailing pause is silent.
    assert_eq!(left_at(&mix, 25.2), 0.0);
}

#[test]
fn long_music_is_trimmed_to_timeline() {
    let music = constant_track("music.mp3", 60.0, 0.2, 1.0);
    let manifest = build_digest_manifest(4.0, RATE, &[], Some(&music)).unwrap();
    assert_eq!(manifest.segments.len(), 1);
    assert_eq!(manifest.segments[0].timeline_end_sample, 400);
    let mix = mix_manifest(&manifest);
    assert_eq!(mix.len(), 800);
    assert!(mix.iter().all(|s| (*s - 0.2).abs() < 1e-6));
}

#[test]
fn narration_is_placed_at_clip_starts() {
    let a = constant_track("a", 1.0, 0.3, 1.0);
    let b = constant_track("b", 1.0, -0.4, 1.0);
    let manifest = build_digest_manifest(3.0, RATE, &[(0.0, a), (1.5, b)], None).unwrap();
    let mix = mix_manifest(&manifest);
    assert!((left_at(&mix, 0.5) - 0.3).abs() < 1e-6);
    assert_eq!(left_at(&mix, 1.2), 0.0);
    assert!((left_at(&mix, 2.0) + 0.4).abs() < 1e-6);
}

#[test]
fn sum_is_clamped() {
    let a = constant_track("a", 1.0, 0.9, 1.0);
    let b = constant_track("b", 1.0, 0.9, 1.0);
    let manifest = build_digest_manifest(1.0, RATE, &[(0.0, a), (0.0, b)], None).unwrap();
    assert!(mix_manifest(&manifest).iter().all(|s| *s == 1.0));
}

#[test]
fn mono_and_other_rates_are_resampled() {
    let pcm = AudioPcm {
        sample_rate: 50,
        channels: 1,
        interleaved_f32: vec![0.25; 50],
    };
    let track = AudioTrack::from_pcm("mono", pcm, 1.0);
    assert!((track.duration_sec - 1.0).abs() < 1e-12);
    let manifest = build_digest_manifest(2.0, RATE, &[(0.0, track)], None).unwrap();
    assert_eq!(manifest.segments[0].timeline_end_sample, 100);
    let mix = mix_manifest(&manifest);
    assert!((mix[2 * 40] - 0.25).abs() < 1e-6);
    assert!((mix[2 * 40 + 1] - 0.25).abs() < 1e-6);
    assert_eq!(mix[2 * 150], 0.0);
}

#[test]
fn no_sources_means_silence() {
    let manifest = build_digest_manifest(1.0, RATE, &[], None).unwrap();
    assert!(manifest.is_silent());
    assert!(mix_manifest(&manifest).iter().all(|s| *s == 0.0));
}

#[test]
fn invalid_timeline_is_rejected() {
    assert!(build_digest_manifest(0.0, RATE, &[], None).is_err());
    assert!(build_digest_manifest(1.0, 0, &[], None).is_err());
}

#[test]
fn f32le_file_round_trips_through_media_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mix.f32le");
    write_mix_to_f32le_file(&[0.5, -1.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let pcm = media::pcm_from_f32le(&bytes, RATE, 2).unwrap();
    assert_eq!(pcm.interleaved_f32, vec![0.5, -1.0]);
}
