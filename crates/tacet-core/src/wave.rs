//! Periodic wave synthesis from Fourier coefficients.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::{Error, Result};

/// Number of slots in a synthesized wavetable.
pub const WAVETABLE_SIZE: usize = 2048;

/// A wavetable realized from harmonic coefficients, ready for an oscillator.
///
/// `real[n]`/`imag[n]` are the cosine/sine weights of harmonic `n`
/// (`real[0]` is the DC offset). The table is synthesized once at
/// construction; cloning shares it.
#[derive(Debug, Clone)]
pub struct PeriodicWave {
    real: Arc<[f32]>,
    imag: Arc<[f32]>,
    disable_normalization: bool,
    wavetable: Arc<[f32]>,
}

impl PeriodicWave {
    /// Synthesize a wavetable from equal-length coefficient arrays
    /// (length >= 2).
    pub fn new(real: &[f32], imag: &[f32], disable_normalization: bool) -> Result<Self> {
        if real.len() != imag.len() {
            return Err(Error::validation(format!(
                "coefficient arrays differ in length ({} real vs {} imag)",
                real.len(),
                imag.len()
            )));
        }
        if real.len() < 2 {
            return Err(Error::validation(format!(
                "need at least 2 coefficients per array, got {}",
                real.len()
            )));
        }

        let mut table = vec![0.0f32; WAVETABLE_SIZE];
        for (i, slot) in table.iter_mut().enumerate() {
            let theta = TAU * i as f64 / WAVETABLE_SIZE as f64;
            let mut acc = 0.0f64;
            for (n, (&re, &im)) in real.iter().zip(imag.iter()).enumerate() {
                let phase = theta * n as f64;
                acc += re as f64 * phase.cos() - im as f64 * phase.sin();
            }
            *slot = acc as f32;
        }

        if !disable_normalization {
            let max = table.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
            if max > 0.0 {
                for slot in table.iter_mut() {
                    *slot /= max;
                }
            }
        }

        Ok(Self {
            real: real.into(),
            imag: imag.into(),
            disable_normalization,
            wavetable: table.into(),
        })
    }

    pub fn real(&self) -> &[f32] {
        &self.real
    }

    pub fn imag(&self) -> &[f32] {
        &self.imag
    }

    pub fn normalization_disabled(&self) -> bool {
        self.disable_normalization
    }

    /// The synthesized table, [`WAVETABLE_SIZE`] samples.
    pub fn wavetable(&self) -> &[f32] {
        &self.wavetable
    }
}
