//! Integration tests for chiptone-synth.
//!
//! Checks the pieces working together: parsed notation driving voices,
//! measured square-wave pitch, effect gating over whole tones, and the bank
//! mixing several voices with different lifetimes.

use chiptone_synth::{
    Effect, NotationParser, ToneRequest, VOICE_COUNT, VOICE_GAIN, Voice, VoiceBank, modulate,
    parse_notation,
};

const SR: f32 = 22050.0;

/// Count rising zero crossings (negative to positive).
fn rising_edges(signal: &[f32]) -> usize {
    signal
        .windows(2)
        .filter(|w| w[0] < 0.0 && w[1] > 0.0)
        .count()
}

fn render_voice(voice: &mut Voice, n: usize) -> Vec<f32> {
    (0..n).map(|_| voice.tick()).collect()
}

// ============================================================================
// 1. Pitch
// ============================================================================

#[test]
fn square_wave_pitch_matches_request() {
    let mut voice = Voice::new(SR);
    voice.set(ToneRequest::new(441, 0, 10, Effect::None));
    let out = render_voice(&mut voice, SR as usize);
    let edges = rising_edges(&out);
    assert!((440..=441).contains(&edges), "got {edges} cycles");
}

#[test]
fn parsed_concert_a_plays_at_440() {
    let parsed = NotationParser::new(2).parse("^A");
    let token = parsed.tokens[0];
    assert_eq!(token.frequency(), 440);

    let mut voice = Voice::new(SR);
    voice.set(ToneRequest::new(token.frequency(), 0, 10, Effect::None));
    let out = render_voice(&mut voice, SR as usize);
    let edges = rising_edges(&out);
    assert!((439..=440).contains(&edges), "got {edges} cycles");
}

#[test]
fn accidentals_order_frequencies() {
    let parsed = parse_notation("Cb C C#");
    let f: Vec<u32> = parsed.tokens.iter().map(|t| t.frequency()).collect();
    assert!(f[0] < f[1] && f[1] < f[2], "{f:?}");
}

// ============================================================================
// 2. Effects over a whole tone
// ============================================================================

#[test]
fn fixed_effect_mutes_half_the_samples() {
    let mut voice = Voice::new(SR);
    voice.set(ToneRequest::new(300, 0, 10, Effect::Fixed { level: 10 }));
    // Window = 80 samples, run an even number of windows
    let out = render_voice(&mut voice, 80 * 100);
    let silent = out.iter().filter(|s| **s == 0.0).count();
    assert_eq!(silent, out.len() / 2);
}

#[test]
fn no_effect_never_mutes() {
    let mut voice = Voice::new(SR);
    voice.set(ToneRequest::new(300, 0, 7, Effect::None));
    let out = render_voice(&mut voice, 10_000);
    assert!(out.iter().all(|s| *s != 0.0));
}

#[test]
fn down_effect_settles_to_open_gate() {
    let mut voice = Voice::new(SR);
    voice.set(ToneRequest::new(300, 0, 10, Effect::Down { level: 2 }));
    let step = voice.step_ticks() as usize;
    // 2 levels * 8 steps, plus margin
    render_voice(&mut voice, step * 20);
    assert_eq!(voice.effect_offset(), 0.0);
    let tail = render_voice(&mut voice, 2000);
    assert!(tail.iter().all(|s| *s != 0.0));
}

#[test]
fn bounce_stays_between_bounds() {
    let effect = Effect::Bounce { level: 6, low: 2 };
    let offsets: Vec<f32> = (0..500).map(|s| modulate(effect, s)).collect();
    assert!(offsets.iter().all(|o| (2.0..=6.0).contains(o)));
    assert_eq!(offsets[0], 6.0);
    assert_eq!(offsets[32], 2.0);
    assert_eq!(offsets[64], 6.0);
}

// ============================================================================
// 3. Bank mixing
// ============================================================================

#[test]
fn voices_finish_in_duration_order() {
    let mut bank: VoiceBank<VOICE_COUNT> = VoiceBank::new(SR);
    for i in 0..VOICE_COUNT {
        let ticks = (i as u64 + 1) * 100;
        bank.set(i, ToneRequest::new(200 + 50 * i as u32, ticks, 4, Effect::None))
            .unwrap();
    }

    let mut block = vec![0.0f32; 100];
    let mut masks = Vec::new();
    for _ in 0..VOICE_COUNT {
        bank.render(&mut block);
        masks.push(bank.sounding_mask());
    }
    assert_eq!(masks, [0b11110, 0b11100, 0b11000, 0b10000, 0]);
}

#[test]
fn full_bank_at_full_volume_stays_in_range() {
    let mut bank: VoiceBank<VOICE_COUNT> = VoiceBank::new(SR);
    for i in 0..VOICE_COUNT {
        bank.set(i, ToneRequest::new(110 * (i as u32 + 1), 0, 10, Effect::None))
            .unwrap();
    }
    let mut block = vec![0.0f32; 4096];
    bank.render(&mut block);
    assert!(block.iter().all(|s| (-1.0..=1.0).contains(s)));
    let peak = block.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > VOICE_GAIN * 4.0 - 1e-6);
}

#[test]
fn sample_rate_change_keeps_pitch() {
    let mut bank: VoiceBank<1> = VoiceBank::new(SR);
    bank.set(0, ToneRequest::new(500, 0, 10, Effect::None)).unwrap();
    bank.set_sample_rate(48000.0);
    let mut block = vec![0.0f32; 48000];
    bank.render(&mut block);
    let edges = rising_edges(&block);
    assert!((499..=500).contains(&edges), "got {edges} cycles");
}
