//! src/error.rs
//! This module defines the custom error types for the entire library.
//! By using a centralized error enum, we can replace all panics with recoverable
//! Results, making the library safer and more robust for consumers.

use num_complex::Complex;
use thiserror::Error;

/// The primary error type for all fallible operations in this library.
#[derive(Error, Debug)]
pub enum KpmError {
    // --- I/O and Parsing Errors ---
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data from file '{file}': {message}")]
    FileParse { file: String, message: String },

    // --- Invalid Input and Arguments ---
    #[error("Coordinate ({x}, {y}, sector {sector}) lies outside the {size_x}x{size_y} lattice")]
    OutOfBounds {
        x: isize,
        y: isize,
        sector: usize,
        size_x: usize,
        size_y: usize,
    },

    #[error("Basis index {index} is out of range for a Hamiltonian of dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    #[error("Invalid solver configuration: {0}")]
    Configuration(String),

    // --- Model Consistency and Physics Errors ---
    #[error("On-site energy must be a real number, but got {0}")]
    OnsiteMustBeReal(Complex<f64>),

    #[error(
        "Hermiticity violated: H[{dest}][{src}] does not equal the conjugate of H[{src}][{dest}]"
    )]
    NotHermitian { dest: usize, src: usize },

    #[error(
        "Spectral bound {bound} exceeds the scale factor {scale_factor}; the rescaled spectrum leaves [-1, 1]"
    )]
    ScaleFactorTooSmall { bound: f64, scale_factor: f64 },
}

/// A specialized `Result` type for this library's operations.
pub type Result<T> = std::result::Result<T, KpmError>;
