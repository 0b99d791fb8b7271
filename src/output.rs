//! Plain-text output of computed spectral densities.
//!
//! One row per sample: `x  y  spin  energy  density`, where `spin` is 0 for
//! the up channel and 1 for the down channel. The format is stable and
//! trivially re-readable by plotting scripts.

use crate::basis::SpinChannel;
use crate::chebyshev::SpinPolarizedLdos;
use crate::error::Result;
use std::fs::File;
use std::io::Write;

pub fn write_spin_polarized_ldos(ldos: &SpinPolarizedLdos, output: &str) -> Result<()> {
    let mut file = File::create(output)?;
    let mut s0 = String::new();
    for site in ldos.sites.iter() {
        for (spin, channel) in [(0, SpinChannel::Up), (1, SpinChannel::Down)] {
            let density = site.channel(channel);
            for (energy, rho) in ldos.energies.iter().zip(density.iter()) {
                s0.push_str(&format!(
                    "{:>5} {:>5} {:>2}   {:>12.6}   {:>12.6}\n",
                    site.x, site.y, spin, energy, rho
                ));
            }
        }
    }
    write!(file, "{}", s0)?;
    Ok(())
}
