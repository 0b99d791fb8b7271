//! The Bogoliubov-de Gennes basis of the lattice model.
//!
//! Every lattice site carries four states: the two spin projections of the
//! particle sector and their particle-hole conjugates. The [`BasisSet`]
//! flattens the coordinate tuple $(x, y, \sigma)$ into a dense row index so
//! that the Hamiltonian can be stored as an ordinary sparse matrix.

use crate::error::{KpmError, Result};

/// The four sectors of the doubled spin x particle-hole basis.
///
/// The discriminants match the sector integers of the coordinate tuple:
/// 0 and 1 are the particle sector, 2 and 3 the hole sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SpinSector {
    Up = 0,
    Down = 1,
    HoleUp = 2,
    HoleDown = 3,
}

/// The two physical spin channels the LDOS is resolved into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinChannel {
    Up,
    Down,
}

impl SpinSector {
    pub const ALL: [SpinSector; 4] = [
        SpinSector::Up,
        SpinSector::Down,
        SpinSector::HoleUp,
        SpinSector::HoleDown,
    ];

    pub fn from_usize(s: usize) -> Option<SpinSector> {
        match s {
            0 => Some(SpinSector::Up),
            1 => Some(SpinSector::Down),
            2 => Some(SpinSector::HoleUp),
            3 => Some(SpinSector::HoleDown),
            _ => None,
        }
    }

    /// The particle-hole partner of this sector.
    pub fn conjugate(self) -> SpinSector {
        match self {
            SpinSector::Up => SpinSector::HoleUp,
            SpinSector::Down => SpinSector::HoleDown,
            SpinSector::HoleUp => SpinSector::Up,
            SpinSector::HoleDown => SpinSector::Down,
        }
    }

    /// Spin flip within the same particle/hole block.
    pub fn flipped(self) -> SpinSector {
        match self {
            SpinSector::Up => SpinSector::Down,
            SpinSector::Down => SpinSector::Up,
            SpinSector::HoleUp => SpinSector::HoleDown,
            SpinSector::HoleDown => SpinSector::HoleUp,
        }
    }

    /// The physical spin channel this sector is aggregated into.
    pub fn spin_channel(self) -> SpinChannel {
        match self {
            SpinSector::Up | SpinSector::HoleUp => SpinChannel::Up,
            SpinSector::Down | SpinSector::HoleDown => SpinChannel::Down,
        }
    }

    /// The spin sign $2(s - 1/2)$: -1 for up, +1 for down, carried over to
    /// the hole block. Spin-dependent amplitudes in the BdG Hamiltonian are
    /// proportional to this factor.
    pub fn spin_sign(self) -> f64 {
        match self {
            SpinSector::Up | SpinSector::HoleUp => -1.0,
            SpinSector::Down | SpinSector::HoleDown => 1.0,
        }
    }
}

/// Boundary policy for nearest-neighbor bonds.
///
/// `Open` simply never creates a bond past the lattice edge; `Periodic`
/// wraps the coordinate modulo the lattice extent. The two give materially
/// different spectra on small lattices, so the choice is an explicit flag
/// rather than a property of the loop bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Open,
    Periodic,
}

/// A physical coordinate tuple $(x, y, \sigma)$.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteIndex {
    pub x: usize,
    pub y: usize,
    pub sector: SpinSector,
}

impl SiteIndex {
    pub fn new(x: usize, y: usize, sector: SpinSector) -> SiteIndex {
        SiteIndex { x, y, sector }
    }
}

/// The finite 2D lattice and its flattened BdG basis.
///
/// The mapping is a bijection between coordinate tuples inside the lattice
/// bounds and the dense indices `0..dim()`, with `dim() = size_x*size_y*4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasisSet {
    pub size_x: usize,
    pub size_y: usize,
}

impl BasisSet {
    pub fn new(size_x: usize, size_y: usize) -> BasisSet {
        BasisSet { size_x, size_y }
    }

    /// The dimension of the flattened basis.
    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.size_x * self.size_y * 4
    }

    /// Flatten a coordinate tuple into its dense basis index.
    pub fn index(&self, site: SiteIndex) -> Result<usize> {
        if site.x >= self.size_x || site.y >= self.size_y {
            return Err(KpmError::OutOfBounds {
                x: site.x as isize,
                y: site.y as isize,
                sector: site.sector as usize,
                size_x: self.size_x,
                size_y: self.size_y,
            });
        }
        Ok((site.x * self.size_y + site.y) * 4 + site.sector as usize)
    }

    /// The coordinate tuple of a dense basis index.
    pub fn site(&self, index: usize) -> Result<SiteIndex> {
        if index >= self.dim() {
            return Err(KpmError::IndexOutOfRange {
                index,
                dim: self.dim(),
            });
        }
        let sector = SpinSector::from_usize(index % 4).unwrap();
        let cell = index / 4;
        Ok(SiteIndex {
            x: cell / self.size_y,
            y: cell % self.size_y,
            sector,
        })
    }

    /// The neighbor of `site` displaced by `(dx, dy)`, or `None` when the
    /// bond leaves the lattice under an open boundary.
    pub fn neighbor(
        &self,
        site: SiteIndex,
        dx: isize,
        dy: isize,
        boundary: Boundary,
    ) -> Option<SiteIndex> {
        let nx = site.x as isize + dx;
        let ny = site.y as isize + dy;
        match boundary {
            Boundary::Open => {
                if nx < 0 || nx >= self.size_x as isize || ny < 0 || ny >= self.size_y as isize {
                    None
                } else {
                    Some(SiteIndex::new(nx as usize, ny as usize, site.sector))
                }
            }
            Boundary::Periodic => {
                let nx = nx.rem_euclid(self.size_x as isize) as usize;
                let ny = ny.rem_euclid(self.size_y as isize) as usize;
                Some(SiteIndex::new(nx, ny, site.sector))
            }
        }
    }
}
