/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All cues are generated as in-memory WAV buffers at init time, two
/// variants each. Playback is fire-and-forget (non-blocking) via rodio's
/// Sink. Most cues pick a random variant and play at a random pitch in
/// [0.95, 1.05] so repeated actions don't sound identical.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use scavenger::sim::services::{AudioService, SoundCue};

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::Rng;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    use scavenger::sim::services::SoundCue;

    const SAMPLE_RATE: u32 = 22050;
    const LOW_PITCH: f32 = 0.95;
    const HIGH_PITCH: f32 = 1.05;

    /// Second variant of every cue is the first one shifted up by this ratio.
    const VARIANT_SHIFT: f32 = 1.12;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        cues: HashMap<SoundCue, [Arc<Vec<u8>>; 2]>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            // ── Generate all sound buffers ──
            let all = [
                SoundCue::Footstep,
                SoundCue::Chop,
                SoundCue::Eat,
                SoundCue::Drink,
                SoundCue::EnemyAttack,
                SoundCue::EnemyHit,
                SoundCue::EnemyDeath,
                SoundCue::GameOver,
            ];
            let cues = all
                .into_iter()
                .map(|cue| {
                    let a = Arc::new(make_wav(&generate(cue, 1.0)));
                    let b = Arc::new(make_wav(&generate(cue, VARIANT_SHIFT)));
                    (cue, [a, b])
                })
                .collect();

            Some(SoundEngine { _stream: stream, handle, cues })
        }

        pub fn play_cue(&self, cue: SoundCue) {
            let Some(variants) = self.cues.get(&cue) else { return };
            let mut rng = rand::thread_rng();
            let (buf, pitch) = if randomized(cue) {
                (&variants[rng.gen_range(0..2)], rng.gen_range(LOW_PITCH..HIGH_PITCH))
            } else {
                (&variants[0], 1.0)
            };

            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src.speed(pitch));
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    /// One-off stings keep their pitch; everything else is varied.
    fn randomized(cue: SoundCue) -> bool {
        !matches!(cue, SoundCue::EnemyDeath | SoundCue::GameOver)
    }

    fn generate(cue: SoundCue, shift: f32) -> Vec<f32> {
        match cue {
            SoundCue::Footstep => gen_step(shift),
            SoundCue::Chop => gen_chop(shift),
            SoundCue::Eat => gen_arpeggio(&[523.0, 659.0, 784.0], shift),
            SoundCue::Drink => gen_sweep(400.0 * shift, 1200.0 * shift, 0.14, 0.22),
            SoundCue::EnemyAttack => gen_growl(shift),
            SoundCue::EnemyHit => gen_blip(880.0 * shift, 0.06, 0.3),
            SoundCue::EnemyDeath => gen_sweep(700.0, 120.0, 0.3, 0.3),
            SoundCue::GameOver => gen_dirge(),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn sine(t: f32, freq: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                sine(t, freq) * env * volume
            })
            .collect()
    }

    /// Linear frequency sweep
    fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Quick ascending arpeggio, square-ish for a retro feel
    fn gen_arpeggio(notes: &[f32], shift: f32) -> Vec<f32> {
        let note_dur = 0.04;
        let mut samples = Vec::new();
        for &freq in notes {
            let freq = freq * shift;
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = sine(t, freq) * 0.7 + sine(t, freq * 3.0) * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Footstep: very short low thump with a little grit
    fn gen_step(shift: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.05) as usize;
        let mut rng: u32 = 777;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(2.0);
                (sine(ti, 110.0 * shift) * 0.7 + noise * 0.3) * env * 0.3
            })
            .collect()
    }

    /// Chop: noise burst with descending pitch
    fn gen_chop(shift: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.1) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = (200.0 + (1.0 - t) * 300.0) * shift;
                let ti = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.8);
                (sine(ti, freq) * 0.4 + noise * 0.6) * env * 0.3
            })
            .collect()
    }

    /// Enemy attack: low buzzing growl
    fn gen_growl(shift: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.18) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = (90.0 + 40.0 * (t * 12.0).sin()) * shift;
                let saw = 2.0 * (ti * freq - (ti * freq + 0.5).floor());
                saw * (1.0 - t) * 0.3
            })
            .collect()
    }

    /// Game over: sad descending tone
    fn gen_dirge() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let note_dur = 0.14;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push(sine(t, freq) * env * 0.3);
            }
        }
        // Final fade
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for i in (total - fade_len)..total {
            let ratio = (total - i) as f32 / fade_len as f32;
            samples[i] *= ratio;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    /// 16-bit mono PCM WAV, the only thing rodio's decoder is fed here.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const BYTES_PER_SAMPLE: u32 = 2;
        let data_len = samples.len() as u32 * BYTES_PER_SAMPLE;

        fn chunk(wav: &mut Vec<u8>, tag: &[u8; 4], len: u32) {
            wav.extend_from_slice(tag);
            wav.extend_from_slice(&len.to_le_bytes());
        }

        let mut wav = Vec::with_capacity(44 + data_len as usize);
        chunk(&mut wav, b"RIFF", 36 + data_len);
        wav.extend_from_slice(b"WAVE");
        chunk(&mut wav, b"fmt ", 16);
        for half in [1u16, 1] {
            // format = PCM, channels = 1
            wav.extend_from_slice(&half.to_le_bytes());
        }
        wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        wav.extend_from_slice(&(SAMPLE_RATE * BYTES_PER_SAMPLE).to_le_bytes());
        wav.extend_from_slice(&(BYTES_PER_SAMPLE as u16).to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        chunk(&mut wav, b"data", data_len);

        wav.extend(samples.iter().flat_map(|s| ((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes()));
        wav
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_cue(&self, _cue: SoundCue) {}
}

impl AudioService for SoundEngine {
    fn play(&mut self, cue: SoundCue) {
        self.play_cue(cue);
    }
}
