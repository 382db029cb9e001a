//! Ambient noise level from the default microphone.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SampleRate, SizedSample, StreamConfig};
use tracing::{debug, warn};

use super::SensorSource;
use crate::analysis::{power_spectral_density, rms, round2, Spectrum};
use crate::error::{Error, Result};
use crate::reading::Value;
use crate::{DEFAULT_NFFT, DEFAULT_SAMPLE_RATE};

/// Extra time allowed on top of the capture window before giving up.
const CAPTURE_SLACK: Duration = Duration::from_secs(2);

/// Records mono audio.
pub trait AudioCapture {
    /// Blocks until `frames` single-channel samples at `sample_rate` Hz are captured.
    fn record(&self, frames: usize, sample_rate: u32) -> Result<Vec<i16>>;
}

/// Receives the power spectrum computed from each capture.
pub trait SpectrumSink {
    /// Presents the spectrum, e.g. by plotting it.
    fn present(&self, spectrum: &Spectrum) -> Result<()>;
}

impl<S: SpectrumSink + ?Sized> SpectrumSink for Box<S> {
    fn present(&self, spectrum: &Spectrum) -> Result<()> {
        (**self).present(spectrum)
    }
}

/// Audio capture from the default input device.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalCapture;

impl CpalCapture {
    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        tx: Sender<Vec<i16>>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample,
        i16: FromSample<T>,
    {
        let channels = usize::from(config.channels.max(1));
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    // Keep the first channel of every frame
                    let mono: Vec<i16> = data
                        .chunks(channels)
                        .filter_map(|frame| frame.first())
                        .map(|&s| s.to_sample::<i16>())
                        .collect();
                    // The receiver goes away once enough frames arrived
                    let _ = tx.send(mono);
                },
                |e| warn!("Audio stream error: {}", e),
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))
    }
}

impl AudioCapture for CpalCapture {
    fn record(&self, frames: usize, sample_rate: u32) -> Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Unavailable("no audio input device".to_string()))?;
        debug!(
            "Recording {} frames at {} Hz from {}",
            frames,
            sample_rate,
            device.name().unwrap_or_else(|_| "unknown device".to_string())
        );

        let rate = SampleRate(sample_rate);
        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .filter(|c| c.min_sample_rate() <= rate && rate <= c.max_sample_rate())
            .min_by_key(|c| c.channels())
            .ok_or_else(|| {
                Error::Audio(format!("no input configuration supports {} Hz", sample_rate))
            })?
            .with_sample_rate(rate);

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let (tx, rx) = mpsc::channel();

        let stream = match sample_format {
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, tx)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, tx)?,
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &config, tx)?,
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, tx)?,
            other => {
                return Err(Error::Audio(format!("unsupported sample format {}", other)));
            }
        };
        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let window = Duration::from_secs_f64(frames as f64 / f64::from(sample_rate.max(1)));
        let deadline = Instant::now() + window + CAPTURE_SLACK;
        let mut samples = Vec::with_capacity(frames);

        while samples.len() < frames {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(chunk) => samples.extend(chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(Error::Audio(format!(
                        "capture timed out after {} of {} frames",
                        samples.len(),
                        frames
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Audio("audio stream closed".to_string()));
                }
            }
        }
        drop(stream);

        samples.truncate(frames);
        Ok(samples)
    }
}

/// Microphone noise source: RMS amplitude of a fixed-length recording.
pub struct MicrophoneNoiseSource {
    capture: Box<dyn AudioCapture>,
    duration: Duration,
    sample_rate: u32,
    nfft: usize,
    spectrum_sink: Option<Box<dyn SpectrumSink>>,
}

impl MicrophoneNoiseSource {
    /// Creates a source recording 2 seconds at 44100 Hz from the default microphone.
    pub fn new() -> Self {
        Self::with_capture(CpalCapture)
    }

    /// Creates a source recording through a custom capture provider.
    pub fn with_capture(capture: impl AudioCapture + 'static) -> Self {
        Self {
            capture: Box::new(capture),
            duration: Duration::from_secs(2),
            sample_rate: DEFAULT_SAMPLE_RATE,
            nfft: DEFAULT_NFFT,
            spectrum_sink: None,
        }
    }

    /// Sets the recording length.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the sample rate in Hz.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the FFT segment length used for the spectrum.
    pub fn nfft(mut self, nfft: usize) -> Self {
        self.nfft = nfft;
        self
    }

    /// Hands the power spectrum of every capture to `sink`.
    pub fn with_spectrum_sink(mut self, sink: impl SpectrumSink + 'static) -> Self {
        self.spectrum_sink = Some(Box::new(sink));
        self
    }

    /// Number of frames captured per measurement.
    pub fn frames(&self) -> usize {
        (self.duration.as_secs_f64() * f64::from(self.sample_rate)).round() as usize
    }
}

impl Default for MicrophoneNoiseSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for MicrophoneNoiseSource {
    fn measurement(&self) -> &str {
        "microphone noise level"
    }

    fn measure(&self) -> Result<Value> {
        let samples = self.capture.record(self.frames(), self.sample_rate)?;
        if samples.is_empty() {
            return Err(Error::Audio("no samples captured".to_string()));
        }

        let level = round2(rms(&samples));
        debug!("Noise RMS {} over {} samples", level, samples.len());

        if let Some(sink) = &self.spectrum_sink {
            let spectrum = power_spectral_density(&samples, self.sample_rate, self.nfft);
            if let Err(e) = sink.present(&spectrum) {
                warn!("Failed to present noise spectrum: {}", e);
            }
        }

        Ok(Value::Number(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct ConstantCapture {
        amplitude: i16,
        requested: Rc<RefCell<Vec<(usize, u32)>>>,
    }

    impl ConstantCapture {
        fn new(amplitude: i16) -> Self {
            Self {
                amplitude,
                requested: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl AudioCapture for ConstantCapture {
        fn record(&self, frames: usize, sample_rate: u32) -> Result<Vec<i16>> {
            self.requested.borrow_mut().push((frames, sample_rate));
            Ok(vec![self.amplitude; frames])
        }
    }

    struct NoDevice;

    impl AudioCapture for NoDevice {
        fn record(&self, _frames: usize, _sample_rate: u32) -> Result<Vec<i16>> {
            Err(Error::Unavailable("no audio input device".to_string()))
        }
    }

    struct EmptyCapture;

    impl AudioCapture for EmptyCapture {
        fn record(&self, _frames: usize, _sample_rate: u32) -> Result<Vec<i16>> {
            Ok(Vec::new())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<Spectrum>>>);

    impl SpectrumSink for RecordingSink {
        fn present(&self, spectrum: &Spectrum) -> Result<()> {
            self.0.borrow_mut().push(spectrum.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl SpectrumSink for FailingSink {
        fn present(&self, _spectrum: &Spectrum) -> Result<()> {
            Err(Error::Plot("no display".to_string()))
        }
    }

    #[test]
    fn test_default_capture_window() {
        let capture = ConstantCapture::new(0);
        let requested = Rc::clone(&capture.requested);
        let source = MicrophoneNoiseSource::with_capture(capture);

        assert_eq!(source.frames(), 88_200);
        source.measure().unwrap();
        assert_eq!(*requested.borrow(), vec![(88_200, 44_100)]);
    }

    #[test]
    fn test_silence_is_zero() {
        let source = MicrophoneNoiseSource::with_capture(ConstantCapture::new(0));
        let mut diagnostics = Vec::new();

        assert_eq!(source.query(&mut diagnostics), Some(Value::Number(0.0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_constant_amplitude() {
        let source = MicrophoneNoiseSource::with_capture(ConstantCapture::new(512))
            .duration(Duration::from_millis(100));
        assert_eq!(source.measure().unwrap(), Value::Number(512.0));
    }

    #[test]
    fn test_missing_device_is_absent() {
        let source = MicrophoneNoiseSource::with_capture(NoDevice);
        let mut diagnostics = Vec::new();

        assert_eq!(source.query(&mut diagnostics), None);
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Error retrieving microphone noise level: no audio input device\n"
        );
    }

    #[test]
    fn test_empty_capture_is_absent() {
        let source = MicrophoneNoiseSource::with_capture(EmptyCapture);
        let mut diagnostics = Vec::new();

        assert_eq!(source.query(&mut diagnostics), None);
        assert_eq!(String::from_utf8(diagnostics).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_spectrum_sink_receives_spectrum() {
        let sink = RecordingSink::default();
        let source = MicrophoneNoiseSource::with_capture(ConstantCapture::new(100))
            .sample_rate(8_000)
            .duration(Duration::from_millis(500))
            .nfft(128)
            .with_spectrum_sink(sink.clone());

        assert_eq!(source.measure().unwrap(), Value::Number(100.0));

        let spectra = sink.0.borrow();
        assert_eq!(spectra.len(), 1);
        assert_eq!(spectra[0].len(), 65);
        assert_eq!(spectra[0].frequencies[64], 4_000.0);
        assert_eq!(spectra[0].peak_bin(), Some(0));
    }

    #[test]
    fn test_sink_failure_keeps_reading() {
        let source = MicrophoneNoiseSource::with_capture(ConstantCapture::new(10))
            .duration(Duration::from_millis(50))
            .with_spectrum_sink(FailingSink);
        let mut diagnostics = Vec::new();

        assert_eq!(source.query(&mut diagnostics), Some(Value::Number(10.0)));
        assert!(diagnostics.is_empty());
    }
}
