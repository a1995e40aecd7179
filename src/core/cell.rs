//! Spatial cell identifiers.
//!
//! Cells are the backend's hierarchical decomposition of the sphere: a cube projected
//! onto the unit sphere, each face subdivided by a quadtree and numbered along a
//! Hilbert curve. An id packs `[face(3)] [position(2 * level)] [1] [0...]`.

/// Deepest subdivision level
pub const MAX_LEVEL: u8 = 30;

const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;
const MAX_SIZE: u32 = 1 << MAX_LEVEL;

const SWAP_MASK: usize = 0x01;
const INVERT_MASK: usize = 0x02;

// Hilbert position of child (i, j) for each orientation, indexed by (i << 1) | j
const IJ_TO_POS: [[u64; 4]; 4] = [[0, 1, 3, 2], [0, 3, 1, 2], [2, 3, 1, 0], [2, 1, 3, 0]];
const POS_TO_ORIENTATION: [usize; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

/// A cell identifier on the Hilbert curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub u64);

impl CellId {
    /// Leaf cell containing the given position in degrees
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        let (lat, lng) = (lat.to_radians(), lng.to_radians());
        let point = [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()];
        let (face, u, v) = xyz_to_face_uv(point);
        let i = st_to_ij(uv_to_st(u));
        let j = st_to_ij(uv_to_st(v));
        Self::from_face_ij(face, i, j)
    }

    fn from_face_ij(face: u8, i: u32, j: u32) -> Self {
        let mut orientation = usize::from(face) & SWAP_MASK;
        let mut position = 0u64;
        for k in (0..u32::from(MAX_LEVEL)).rev() {
            let ij = (((i >> k) & 1) << 1 | ((j >> k) & 1)) as usize;
            let pos = IJ_TO_POS[orientation][ij];
            position |= pos << (2 * k);
            orientation ^= POS_TO_ORIENTATION[pos as usize];
        }
        CellId((u64::from(face) << POS_BITS) | (position << 1) | 1)
    }

    /// Cube face, 0..6
    pub fn face(self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }

    /// Lowest set bit, which encodes the level
    fn lsb(self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    fn lsb_for_level(level: u8) -> u64 {
        1u64 << (2 * u32::from(MAX_LEVEL - level))
    }

    pub fn level(self) -> u8 {
        MAX_LEVEL - (self.0.trailing_zeros() / 2) as u8
    }

    /// Ancestor at `level`; levels deeper than this cell are clamped to it
    pub fn parent(self, level: u8) -> Self {
        let level = level.min(self.level());
        let lsb = Self::lsb_for_level(level);
        CellId((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// Next cell along the curve at the same level
    pub fn next(self) -> Self {
        CellId(self.0.wrapping_add(self.lsb() << 1))
    }

    /// Previous cell along the curve at the same level
    pub fn prev(self) -> Self {
        CellId(self.0.wrapping_sub(self.lsb() << 1))
    }
}

fn xyz_to_face_uv(p: [f64; 3]) -> (u8, f64, f64) {
    let [x, y, z] = p;
    let mut face = 0u8;
    let mut largest = x.abs();
    if y.abs() > largest {
        face = 1;
        largest = y.abs();
    }
    if z.abs() > largest {
        face = 2;
    }
    if p[usize::from(face)] < 0.0 {
        face += 3;
    }
    let (u, v) = match face {
        0 => (y / x, z / x),
        1 => (-x / y, z / y),
        2 => (-x / z, -y / z),
        3 => (z / x, y / x),
        4 => (z / y, -x / y),
        _ => (-y / z, -x / z),
    };
    (face, u, v)
}

// Quadratic projection, matches the backend's cell geometry
fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

fn st_to_ij(s: f64) -> u32 {
    let scaled = (f64::from(MAX_SIZE) * s).floor();
    scaled.clamp(0.0, f64::from(MAX_SIZE - 1)) as u32
}
