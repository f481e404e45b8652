//! Playback through the default output device with cpal.
//!
//! One output stream mixes every loaded sound. Each sound is decoded in
//! full when preloaded and converted to the device format, so starting it
//! is a flag flip read by the audio thread.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use elevator_core::elevator::{BundledSound, Playable, SoundBackend, SoundSource};
use elevator_core::{Error, Result};

use super::clip::Clip;

type Voices = Arc<Mutex<Vec<Arc<Voice>>>>;

/// Decoded samples in the device format plus a play cursor
struct Voice {
    samples: Vec<f32>,
    cursor: AtomicUsize,
    playing: AtomicBool,
    /// f32 bits
    volume: AtomicU32,
}

impl Voice {
    fn new(samples: Vec<f32>, volume: f32) -> Self {
        Self {
            samples,
            cursor: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
            volume: AtomicU32::new(volume.to_bits()),
        }
    }

    fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
            && self.cursor.load(Ordering::Acquire) < self.samples.len()
    }

    /// Add the next `out.len()` samples into `out` and advance
    fn mix_into(&self, out: &mut [f32]) {
        if !self.playing.load(Ordering::Acquire) {
            return;
        }

        let len = self.samples.len();
        let start = self.cursor.load(Ordering::Acquire).min(len);
        let end = (start + out.len()).min(len);
        let volume = f32::from_bits(self.volume.load(Ordering::Relaxed));
        for (acc, sample) in out.iter_mut().zip(&self.samples[start..end]) {
            *acc += sample * volume;
        }

        // A rewind that raced this callback keeps its cursor
        let advanced = self
            .cursor
            .compare_exchange(start, end, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if advanced && end == len {
            self.playing.store(false, Ordering::Release);
        }
    }
}

fn mix<T>(voices: &Voices, scratch: &mut Vec<f32>, data: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    scratch.clear();
    scratch.resize(data.len(), 0.0);
    {
        let voices = voices.lock().unwrap_or_else(PoisonError::into_inner);
        for voice in voices.iter() {
            voice.mix_into(scratch);
        }
    }
    for (out, sample) in data.iter_mut().zip(scratch.iter()) {
        *out = T::from_sample(sample.clamp(-1.0, 1.0));
    }
}

/// The open device and its stream
struct Output {
    stream: Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
    voices: Voices,
    /// Set by the stream's error callback
    failed: Arc<AtomicBool>,
}

impl Output {
    fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no default output device".to_string()))?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("no usable output config: {}", e)))?;
        let sample_format = supported.sample_format();
        let config = supported.config();

        let voices: Voices = Arc::new(Mutex::new(Vec::new()));
        let failed = Arc::new(AtomicBool::new(false));
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, &voices, &failed)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, &voices, &failed)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, &voices, &failed)?,
            other => {
                return Err(Error::Audio(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };
        stream
            .play()
            .map_err(|e| Error::Audio(format!("failed to start stream: {}", e)))?;

        tracing::info!(
            "Audio output on {} ({} Hz, {} channel(s), {:?})",
            device_name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        Ok(Self {
            stream,
            device_name,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            voices,
            failed,
        })
    }

    /// Fails once the device has reported an error
    fn ensure_running(&self) -> Result<()> {
        if self.failed.load(Ordering::SeqCst) {
            return Err(Error::Audio(format!(
                "output device {} stopped",
                self.device_name
            )));
        }
        self.stream
            .play()
            .map_err(|e| Error::Audio(format!("device refused playback: {}", e)))
    }

    fn attach(&self, voice: Arc<Voice>) {
        self.voices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(voice);
    }

    fn detach(&self, voice: &Arc<Voice>) {
        self.voices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|other| !Arc::ptr_eq(other, voice));
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    voices: &Voices,
    failed: &Arc<AtomicBool>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let voices = Arc::clone(voices);
    let failed = Arc::clone(failed);
    let mut scratch = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                mix(&voices, &mut scratch, data);
            },
            move |err| {
                tracing::error!("Audio stream error: {}", err);
                failed.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| Error::Audio(format!("failed to build stream: {}", e)))
}

/// Plays sounds on the default output device
pub struct SpeakerBackend {
    output: Rc<Output>,
}

impl SpeakerBackend {
    /// Open the default output device
    pub fn open() -> Result<Self> {
        Ok(Self {
            output: Rc::new(Output::open()?),
        })
    }

    pub fn device_name(&self) -> &str {
        &self.output.device_name
    }
}

impl SoundBackend for SpeakerBackend {
    type Handle = SpeakerSound;

    fn load(&mut self, source: &SoundSource, _slot: BundledSound) -> Result<SpeakerSound> {
        let clip = Clip::open(source)?;
        Ok(SpeakerSound {
            label: clip.label().to_string(),
            clip: Some(clip),
            voice: None,
            volume: 1.0,
            output: Rc::clone(&self.output),
        })
    }
}

pub struct SpeakerSound {
    label: String,
    /// Until preloaded
    clip: Option<Clip>,
    voice: Option<Arc<Voice>>,
    volume: f32,
    output: Rc<Output>,
}

impl SpeakerSound {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Playable for SpeakerSound {
    fn preload(&mut self) -> Result<()> {
        if self.voice.is_some() {
            return Ok(());
        }
        let clip = self
            .clip
            .take()
            .ok_or_else(|| Error::Audio(format!("{} has nothing to decode", self.label)))?;
        let pcm = clip
            .decode()?
            .convert(self.output.sample_rate, self.output.channels)?;

        let voice = Arc::new(Voice::new(pcm.samples, self.volume));
        self.output.attach(Arc::clone(&voice));
        self.voice = Some(voice);
        Ok(())
    }

    fn rewind(&mut self) {
        if let Some(voice) = &self.voice {
            voice.cursor.store(0, Ordering::Release);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(voice) = &self.voice {
            voice.set_volume(self.volume);
        }
    }

    fn play(&mut self) -> Result<()> {
        self.preload()?;
        self.output.ensure_running()?;
        if let Some(voice) = &self.voice {
            voice.playing.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(voice) = &self.voice {
            voice.playing.store(false, Ordering::Release);
        }
    }

    fn is_playing(&self) -> bool {
        self.voice.as_ref().is_some_and(|voice| voice.is_playing())
    }
}

impl Drop for SpeakerSound {
    fn drop(&mut self) {
        if let Some(voice) = self.voice.take() {
            voice.playing.store(false, Ordering::Release);
            self.output.detach(&voice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(samples: Vec<f32>) -> Voice {
        let voice = Voice::new(samples, 1.0);
        voice.playing.store(true, Ordering::Release);
        voice
    }

    #[test]
    fn test_paused_voice_is_silent() {
        let voice = Voice::new(vec![0.5; 8], 1.0);
        let mut out = [0.0; 4];

        voice.mix_into(&mut out);
        assert_eq!(out, [0.0; 4]);
        assert_eq!(voice.cursor.load(Ordering::Acquire), 0);
    }

    #[test]
    fn test_voice_advances_and_finishes() {
        let voice = playing(vec![0.25, 0.5, 0.75]);
        let mut out = [0.0; 2];

        voice.mix_into(&mut out);
        assert_eq!(out, [0.25, 0.5]);
        assert!(voice.is_playing());

        let mut out = [0.0; 2];
        voice.mix_into(&mut out);
        assert_eq!(out, [0.75, 0.0]);
        assert!(!voice.is_playing());
    }

    #[test]
    fn test_voice_volume_scales() {
        let voice = playing(vec![1.0, 1.0]);
        voice.set_volume(0.5);
        let mut out = [0.0; 2];

        voice.mix_into(&mut out);
        assert_eq!(out, [0.5, 0.5]);
    }

    #[test]
    fn test_rewound_voice_starts_over() {
        let voice = playing(vec![0.25, 0.5, 0.75, 1.0]);
        let mut out = [0.0; 2];
        voice.mix_into(&mut out);

        voice.cursor.store(0, Ordering::Release);
        let mut out = [0.0; 2];
        voice.mix_into(&mut out);
        assert_eq!(out, [0.25, 0.5]);
    }

    #[test]
    fn test_mix_sums_and_clamps() {
        let voices: Voices = Arc::new(Mutex::new(vec![
            Arc::new(playing(vec![0.75, 0.25])),
            Arc::new(playing(vec![0.75, -0.5])),
        ]));
        let mut scratch = Vec::new();
        let mut data = [0i16; 2];

        mix(&voices, &mut scratch, &mut data);
        assert_eq!(data[0], i16::MAX);
        assert!(data[1] < 0);
    }
}
