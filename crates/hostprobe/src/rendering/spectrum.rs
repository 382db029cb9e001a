//! Noise spectrum plot.

use anyhow::{bail, Result};
use hostprobe_sensors::{Error, Spectrum, SpectrumSink};
use std::path::PathBuf;
use tracing::info;

use super::canvas::Canvas;

const MARGIN: f32 = 40.0;
const GRID_DIVISIONS: u32 = 5;

const BACKGROUND: u32 = 0xFFFFFF;
const AXIS: u32 = 0x000000;
const GRID: u32 = 0xDDDDDD;
const TRACE: u32 = 0x1F77B4;

/// Plots the power spectrum in dB against frequency and writes it as PNG.
#[derive(Debug, Clone)]
pub struct SpectrumPlot {
    output: PathBuf,
    width: u32,
    height: u32,
}

impl SpectrumPlot {
    /// Creates a plot writing `width`x`height` images to `output`.
    pub fn new(output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            width,
            height,
        }
    }

    /// Renders the spectrum onto a new canvas.
    pub fn render(&self, spectrum: &Spectrum) -> Result<Canvas> {
        if spectrum.len() < 2 {
            bail!("Spectrum needs at least two bins, got {}", spectrum.len());
        }
        if (self.width as f32) <= 2.0 * MARGIN || (self.height as f32) <= 2.0 * MARGIN {
            bail!("Plot size {}x{} is too small", self.width, self.height);
        }

        let mut canvas = Canvas::new(self.width, self.height)?;
        canvas.set_background(BACKGROUND);
        canvas.clear();

        let left = MARGIN;
        let top = MARGIN;
        let plot_w = self.width as f32 - 2.0 * MARGIN;
        let plot_h = self.height as f32 - 2.0 * MARGIN;

        for i in 1..GRID_DIVISIONS {
            let offset = i as f32 / GRID_DIVISIONS as f32;
            canvas.fill_rect(left + offset * plot_w, top, 1.0, plot_h, GRID);
            canvas.fill_rect(left, top + offset * plot_h, plot_w, 1.0, GRID);
        }

        let db = spectrum.power_db();
        let (min_db, max_db) = db
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        // A flat spectrum still gets a visible range
        let span_db = if max_db - min_db > f64::EPSILON {
            max_db - min_db
        } else {
            1.0
        };
        let max_freq = spectrum.frequencies.last().copied().unwrap_or(0.0).max(1.0);

        let points: Vec<(f32, f32)> = spectrum
            .frequencies
            .iter()
            .zip(&db)
            .map(|(&f, &p)| {
                let x = left + (f / max_freq) as f32 * plot_w;
                let y = top + plot_h - ((p - min_db) / span_db) as f32 * plot_h;
                (x, y)
            })
            .collect();
        canvas.draw_polyline(&points, 1.5, TRACE);

        canvas.draw_rect_outline(left, top, plot_w, plot_h, AXIS);
        Ok(canvas)
    }
}

impl SpectrumSink for SpectrumPlot {
    fn present(&self, spectrum: &Spectrum) -> hostprobe_sensors::Result<()> {
        self.render(spectrum)
            .and_then(|canvas| canvas.save_png(&self.output))
            .map_err(|e| Error::Plot(format!("{:#}", e)))?;
        info!("Wrote sound spectrum to {}", self.output.display());
        Ok(())
    }
}
