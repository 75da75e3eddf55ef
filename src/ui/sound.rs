/// Procedural sound effects played through rodio.
///
/// Every effect is synthesized once at startup into an in-memory WAV
/// buffer; playback detaches a Sink and returns immediately.
///
/// Without the "sound" feature `SoundEngine` is an empty stub.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_land: Arc<Vec<u8>>,
        sfx_vision_on: Arc<Vec<u8>>,
        sfx_vision_off: Arc<Vec<u8>>,
        sfx_denied: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
        sfx_restart: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_sweep(300.0, 700.0, 0.09, 0.2))),
                sfx_land: Arc::new(make_wav(&gen_thud())),
                sfx_vision_on: Arc::new(make_wav(&gen_shimmer(&[659.0, 880.0, 1319.0]))),
                sfx_vision_off: Arc::new(make_wav(&gen_shimmer(&[1319.0, 880.0, 659.0]))),
                sfx_denied: Arc::new(make_wav(&gen_buzz())),
                sfx_win: Arc::new(make_wav(&gen_fanfare())),
                sfx_lose: Arc::new(make_wav(&gen_lament())),
                sfx_restart: Arc::new(make_wav(&gen_sweep(440.0, 880.0, 0.06, 0.2))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            match rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("sound decode failed: {e}"),
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_land(&self) { self.play(&self.sfx_land); }
        pub fn play_vision_on(&self) { self.play(&self.sfx_vision_on); }
        pub fn play_vision_off(&self) { self.play(&self.sfx_vision_off); }
        pub fn play_denied(&self) { self.play(&self.sfx_denied); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }
        pub fn play_restart(&self) { self.play(&self.sfx_restart); }
    }

    // ════════════════════════════════════════════════════════════
    //  Generators: mono f32 samples at SAMPLE_RATE
    // ════════════════════════════════════════════════════════════

    fn sample_count(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Sine sweep from `f0` to `f1` Hz with a linear fade out.
    pub(super) fn gen_sweep(f0: f32, f1: f32, seconds: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (f0 + (f1 - f0) * t) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Landing: low, fast-decaying tone.
    fn gen_thud() -> Vec<f32> {
        let n = sample_count(0.05);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ts = i as f32 / SAMPLE_RATE as f32;
                (ts * 110.0 * TAU).sin() * (1.0 - t).powi(3) * 0.25
            })
            .collect()
    }

    /// Vision toggle: overlapping bell notes.
    fn gen_shimmer(notes: &[f32]) -> Vec<f32> {
        let step = sample_count(0.05);
        let ring = sample_count(0.2);
        let mut samples = vec![0.0_f32; step * notes.len().saturating_sub(1) + ring];
        for (k, &freq) in notes.iter().enumerate() {
            for i in 0..ring {
                let ts = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / ring as f32).powf(1.5);
                let wave = (ts * freq * TAU).sin() * 0.7 + (ts * freq * 2.0 * TAU).sin() * 0.3;
                samples[k * step + i] += wave * env * 0.12;
            }
        }
        samples
    }

    /// Vision refused: short square-ish buzz.
    fn gen_buzz() -> Vec<f32> {
        let n = sample_count(0.12);
        (0..n)
            .map(|i| {
                let ts = i as f32 / SAMPLE_RATE as f32;
                let s = (ts * 140.0 * TAU).sin();
                s.signum() * 0.12 * (1.0 - i as f32 / n as f32)
            })
            .collect()
    }

    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, seconds) in seq {
            let n = sample_count(seconds);
            for i in 0..n {
                let ts = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (ts * freq * TAU).sin() * 0.6
                    + (ts * freq * 2.0 * TAU).sin() * 0.3
                    + (ts * freq * 3.0 * TAU).sin() * 0.1;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Oracle reached: C5 E5 G5 C6, last note held.
    fn gen_fanfare() -> Vec<f32> {
        notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)], 0.3)
    }

    /// Fell: A4 F#4 Eb4 C4 with a tail fade.
    fn gen_lament() -> Vec<f32> {
        let mut samples = notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.24)], 0.3);
        let total = samples.len();
        let fade = total / 4;
        for (k, s) in samples[total - fade..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let block_align = channels * bits / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_land(&self) {}
    pub fn play_vision_on(&self) {}
    pub fn play_vision_off(&self) {}
    pub fn play_denied(&self) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
    pub fn play_restart(&self) {}
}

impl SoundEngine {
    /// Play the effect for one event. `VisionReady` is silent.
    pub fn play_event(&self, ev: GameEvent) {
        match ev {
            GameEvent::Jumped => self.play_jump(),
            GameEvent::Landed => self.play_land(),
            GameEvent::VisionActivated => self.play_vision_on(),
            GameEvent::VisionCancelled | GameEvent::VisionExpired => self.play_vision_off(),
            GameEvent::VisionUnavailable => self.play_denied(),
            GameEvent::Won => self.play_win(),
            GameEvent::Lost => self.play_lose(),
            GameEvent::Restarted => self.play_restart(),
            GameEvent::VisionReady => {}
        }
    }
}
