//! Decoding sound sources into PCM with symphonia.
//!
//! Opening a source probes the container and builds a decoder, so a file
//! that is not audio fails right there. Decoding happens later, once, when
//! the handle is preloaded.

use std::borrow::Cow;
use std::io::Cursor;

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use elevator_core::elevator::SoundSource;
use elevator_core::{Error, Result};

/// Interleaved f32 samples
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Pcm {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.max(1))
    }

    /// Convert to the device's channel count and sample rate
    pub fn convert(self, sample_rate: u32, channels: u16) -> Result<Pcm> {
        let remixed = remix(&self.samples, self.channels, channels);
        let samples = resample(remixed, self.sample_rate, sample_rate, channels)?;
        Ok(Pcm {
            samples,
            sample_rate,
            channels,
        })
    }
}

/// A probed source, ready to decode
pub struct Clip {
    label: String,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
}

impl Clip {
    /// Read and probe a bundled or local source
    pub fn open(source: &SoundSource) -> Result<Self> {
        let mut hint = Hint::new();
        let bytes: Cow<'static, [u8]> = match source {
            SoundSource::Bundled(sound) => {
                hint.with_extension("wav");
                Cow::Borrowed(sound.bytes())
            }
            SoundSource::Custom(_) => {
                let path = source
                    .local_path()?
                    .ok_or_else(|| Error::Audio(format!("no local file for {}", source)))?;
                if !path.is_file() {
                    return Err(Error::SoundNotFound(path.display().to_string()));
                }
                if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
                    hint.with_extension(extension);
                }
                Cow::Owned(std::fs::read(&path)?)
            }
        };

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::Audio(format!("unrecognized audio in {}: {}", source, e)))?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Audio(format!("no audio track in {}", source)))?;
        let params = &track.codec_params;
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| Error::Audio(format!("unknown sample rate in {}", source)))?;
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| Error::Audio(format!("unknown channel layout in {}", source)))?;

        let track_id = track.id;
        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| Error::Audio(format!("cannot decode {}: {}", source, e)))?;

        tracing::debug!(
            "Probed {}: {} Hz, {} channel(s)",
            source,
            sample_rate,
            channels
        );

        Ok(Self {
            label: source.label(),
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Decode every packet of the audio track
    pub fn decode(mut self) -> Result<Pcm> {
        let mut samples = Vec::new();

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error reading packet from {}: {}", self.label, e);
                    break;
                }
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut buf =
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping bad packet in {}: {}", self.label, e);
                }
                Err(e) => {
                    return Err(Error::Audio(format!("decoding {}: {}", self.label, e)));
                }
            }
        }

        if samples.is_empty() {
            return Err(Error::Audio(format!("{} contains no audio", self.label)));
        }

        let pcm = Pcm {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        };
        tracing::debug!("Decoded {} ({:.2}s)", self.label, pcm.duration_secs());
        Ok(pcm)
    }
}

/// Map interleaved frames onto another channel count.
///
/// Downmixing to mono averages; otherwise each output channel takes the
/// matching input channel, repeating the last one.
fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let (from, to) = (usize::from(from.max(1)), usize::from(to.max(1)));
    if from == to {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|c| frame[c.min(from - 1)]));
        }
    }
    out
}

fn resample(samples: Vec<f32>, from: u32, to: u32, channels: u16) -> Result<Vec<f32>> {
    if from == to || samples.is_empty() {
        return Ok(samples);
    }

    let channels = usize::from(channels.max(1));
    let frames = samples.len() / channels;
    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|c| samples.iter().skip(c).step_by(channels).copied().collect())
        .collect();

    let mut resampler = FastFixedIn::<f32>::new(
        f64::from(to) / f64::from(from),
        1.0,
        PolynomialDegree::Cubic,
        frames,
        channels,
    )
    .map_err(|e| Error::Audio(format!("cannot resample {} Hz to {} Hz: {}", from, to, e)))?;
    let planar = resampler
        .process(&planar, None)
        .map_err(|e| Error::Audio(format!("resampling failed: {}", e)))?;

    let out_frames = planar.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        out.extend(planar.iter().map(|channel| channel[i]));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use elevator_core::elevator::BundledSound;

    use super::*;

    #[test]
    fn test_bundled_sounds_decode() {
        for sound in [BundledSound::Ambient, BundledSound::Chime] {
            let clip = Clip::open(&SoundSource::Bundled(sound)).unwrap();
            assert_eq!(clip.label(), sound.file_name());

            let pcm = clip.decode().unwrap();
            assert_eq!(pcm.sample_rate, 16_000);
            assert_eq!(pcm.channels, 1);
            assert!(pcm.duration_secs() > 1.0);
        }
    }

    #[test]
    fn test_non_audio_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"this is definitely not an mp3").unwrap();
        let source = SoundSource::Custom(file.path().display().to_string());

        assert!(matches!(Clip::open(&source), Err(Error::Audio(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let source = SoundSource::Custom("/definitely/not/here.mp3".to_string());
        assert!(matches!(Clip::open(&source), Err(Error::SoundNotFound(_))));
    }

    #[test]
    fn test_remote_source_is_rejected() {
        let source = SoundSource::Custom("https://example.com/ding.mp3".to_string());
        assert!(Clip::open(&source).is_err());
    }

    #[test]
    fn test_custom_wav_decodes() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(BundledSound::Chime.bytes()).unwrap();
        let source = SoundSource::Custom(file.path().display().to_string());

        let pcm = Clip::open(&source).unwrap().decode().unwrap();
        assert_eq!(pcm.channels, 1);
    }

    #[test]
    fn test_remix_mono_to_stereo_and_back() {
        let stereo = remix(&[0.5, -0.5], 1, 2);
        assert_eq!(stereo, vec![0.5, 0.5, -0.5, -0.5]);
        assert_eq!(remix(&[0.25, 0.75, 1.0, 0.0], 2, 1), vec![0.5, 0.5]);
    }

    #[test]
    fn test_convert_changes_rate() {
        let pcm = Clip::open(&SoundSource::Bundled(BundledSound::Chime))
            .unwrap()
            .decode()
            .unwrap();
        let seconds = pcm.duration_secs();

        let converted = pcm.convert(48_000, 2).unwrap();
        assert_eq!(converted.channels, 2);
        assert_eq!(converted.sample_rate, 48_000);
        assert!((converted.duration_secs() - seconds).abs() < 0.1);
    }
}
