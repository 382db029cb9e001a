//! Rendering module for the noise spectrum plot.

mod canvas;
mod spectrum;

pub use spectrum::SpectrumPlot;
