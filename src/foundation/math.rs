use crate::foundation::core::{Point, Vec2};

/// FNV-1a 64-bit hasher used for cheap change signatures (dot layouts, paint keys).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 describe the same position.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub(crate) fn wrap_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Rotate `p` around `center` by `deg` degrees (clockwise in y-down raster space).
pub(crate) fn rotate_around(p: Point, center: Point, deg: f64) -> Point {
    if deg == 0.0 {
        return p;
    }
    let (s, c) = deg.to_radians().sin_cos();
    let d = p - center;
    center + Vec2::new(d.x * c - d.y * s, d.x * s + d.y * c)
}

/// Scale the offset of `p` from `center` component-wise.
pub(crate) fn scale_around(p: Point, center: Point, scale: Vec2) -> Point {
    let d = p - center;
    center + Vec2::new(d.x * scale.x, d.y * scale.y)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
