//! Run parameters, read from a YAML file.
//!
//! Complex couplings may be written either as a plain scalar (taken as the
//! real part) or as a two-element sequence `[re, im]`.

use crate::basis::Boundary;
use crate::chebyshev::SolverConfig;
use crate::error::{KpmError, Result};
use crate::island::IslandParams;
use num_complex::Complex;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
enum ComplexParam {
    Real(f64),
    Pair(f64, f64),
}

impl From<ComplexParam> for Complex<f64> {
    fn from(value: ComplexParam) -> Complex<f64> {
        match value {
            ComplexParam::Real(re) => Complex::new(re, 0.0),
            ComplexParam::Pair(re, im) => Complex::new(re, im),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameters {
    size_x: usize,
    size_y: usize,
    radius: f64,
    boundary_width: f64,
    num_coefficients: usize,
    energy_resolution: usize,
    scale_factor: f64,
    lower_bound: f64,
    upper_bound: f64,
    mu: ComplexParam,
    t: ComplexParam,
    delta_s: ComplexParam,
    delta_p: ComplexParam,
    alpha: ComplexParam,
    v_z: ComplexParam,
    cut1d: bool,
    #[serde(default)]
    boundary: Boundary,
}

/// All scalar run parameters of one LDOS calculation.
#[derive(Clone, Copy, Debug)]
pub struct Parameters {
    pub size_x: usize,
    pub size_y: usize,
    pub radius: f64,
    pub boundary_width: f64,
    pub num_coefficients: usize,
    pub energy_resolution: usize,
    pub scale_factor: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub mu: Complex<f64>,
    pub t: Complex<f64>,
    pub delta_s: Complex<f64>,
    pub delta_p: Complex<f64>,
    pub alpha: Complex<f64>,
    pub v_z: Complex<f64>,
    /// Restrict the calculation to a 1D cut at `y = size_y / 2` instead of
    /// the full 2D surface.
    pub cut1d: bool,
    pub boundary: Boundary,
}

impl Parameters {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Parameters> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let text = std::fs::read_to_string(path)?;
        let raw: RawParameters =
            serde_yaml::from_str(&text).map_err(|err| KpmError::FileParse {
                file: file.clone(),
                message: err.to_string(),
            })?;
        let parameters = Parameters {
            size_x: raw.size_x,
            size_y: raw.size_y,
            radius: raw.radius,
            boundary_width: raw.boundary_width,
            num_coefficients: raw.num_coefficients,
            energy_resolution: raw.energy_resolution,
            scale_factor: raw.scale_factor,
            lower_bound: raw.lower_bound,
            upper_bound: raw.upper_bound,
            mu: raw.mu.into(),
            t: raw.t.into(),
            delta_s: raw.delta_s.into(),
            delta_p: raw.delta_p.into(),
            alpha: raw.alpha.into(),
            v_z: raw.v_z.into(),
            cut1d: raw.cut1d,
            boundary: raw.boundary,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    /// Reject out-of-range values before any computation starts. The solver
    /// re-checks its own configuration; the checks here exist so that a bad
    /// parameter file fails immediately with a message naming the field.
    fn validate(&self) -> Result<()> {
        if self.size_x == 0 || self.size_y == 0 {
            return Err(KpmError::Configuration(format!(
                "lattice extents must be positive, got {}x{}",
                self.size_x, self.size_y
            )));
        }
        if self.num_coefficients == 0 {
            return Err(KpmError::Configuration(
                "num_coefficients must be positive".to_string(),
            ));
        }
        if self.energy_resolution == 0 {
            return Err(KpmError::Configuration(
                "energy_resolution must be positive".to_string(),
            ));
        }
        if !(self.scale_factor > 0.0) {
            return Err(KpmError::Configuration(format!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.lower_bound >= self.upper_bound
            || self.lower_bound < -self.scale_factor
            || self.upper_bound > self.scale_factor
        {
            return Err(KpmError::Configuration(format!(
                "energy window [{}, {}] must lie inside [-{}, {}]",
                self.lower_bound, self.upper_bound, self.scale_factor, self.scale_factor
            )));
        }
        if !(self.boundary_width > 0.0) {
            return Err(KpmError::Configuration(format!(
                "boundary_width must be positive, got {}",
                self.boundary_width
            )));
        }
        Ok(())
    }

    pub fn island(&self) -> IslandParams {
        IslandParams {
            size_x: self.size_x,
            size_y: self.size_y,
            radius: self.radius,
            boundary_width: self.boundary_width,
            mu: self.mu,
            t: self.t,
            delta_s: self.delta_s,
            delta_p: self.delta_p,
            alpha: self.alpha,
            v_z: self.v_z,
            boundary: self.boundary,
        }
    }

    pub fn solver(&self) -> SolverConfig {
        SolverConfig {
            num_coefficients: self.num_coefficients,
            scale_factor: self.scale_factor,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            energy_resolution: self.energy_resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GOOD: &str = "\
size_x: 21
size_y: 21
radius: 6.5
boundary_width: 1.0
num_coefficients: 1000
energy_resolution: 500
scale_factor: 10.0
lower_bound: -8.0
upper_bound: 8.0
mu: -4.0
t: 1.0
delta_s: 0.4
delta_p: [0.0, 0.3]
alpha: 0.3
v_z: 1.5
cut1d: true
";

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_a_full_parameter_file() {
        let file = write_file(GOOD);
        let p = Parameters::from_file(file.path()).unwrap();
        assert_eq!(p.size_x, 21);
        assert_eq!(p.num_coefficients, 1000);
        assert_eq!(p.mu, Complex::new(-4.0, 0.0));
        assert_eq!(p.delta_p, Complex::new(0.0, 0.3));
        assert!(p.cut1d);
        assert_eq!(p.boundary, Boundary::Open);
    }

    #[test]
    fn boundary_flag_is_parsed() {
        let file = write_file(&format!("{GOOD}boundary: periodic\n"));
        let p = Parameters::from_file(file.path()).unwrap();
        assert_eq!(p.boundary, Boundary::Periodic);
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let file = write_file("size_x: 4\nsize_y: 4\n");
        assert!(matches!(
            Parameters::from_file(file.path()),
            Err(KpmError::FileParse { .. })
        ));
    }

    #[test]
    fn window_outside_scale_is_rejected() {
        let file = write_file(&GOOD.replace("upper_bound: 8.0", "upper_bound: 12.0"));
        assert!(matches!(
            Parameters::from_file(file.path()),
            Err(KpmError::Configuration(_))
        ));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let file = write_file(&GOOD.replace("energy_resolution: 500", "energy_resolution: 0"));
        assert!(matches!(
            Parameters::from_file(file.path()),
            Err(KpmError::Configuration(_))
        ));
    }
}
