use serde::{Deserialize, Serialize};

/// A 3D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Component-wise difference.
    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::zero()
    }
}

/// A 3x4 affine transform matrix: rotation/scale/shear in the 3x3 block,
/// translation in the last column. Stored row-major as 12 numbers; the
/// implicit 4th row is `[0, 0, 0, 1]` and is omitted, including in the
/// serialized form (a flat 12-number array).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3x4(pub [f64; 12]);

impl Matrix3x4 {
    /// The identity transform.
    pub fn identity() -> Self {
        let mut m = [0.0; 12];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        Self(m)
    }

    /// A pure translation.
    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::identity();
        m.0[3] = t.x;
        m.0[7] = t.y;
        m.0[11] = t.z;
        m
    }

    /// A per-axis scale.
    pub fn scale(s: Vec3) -> Self {
        let mut m = [0.0; 12];
        m[0] = s.x;
        m[5] = s.y;
        m[10] = s.z;
        Self(m)
    }

    /// Rotation about the X axis, in degrees.
    pub fn rotation_x(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Self::identity();
        m.0[5] = cos;
        m.0[6] = -sin;
        m.0[9] = sin;
        m.0[10] = cos;
        m
    }

    /// Rotation about the Y axis, in degrees.
    pub fn rotation_y(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Self::identity();
        m.0[0] = cos;
        m.0[2] = sin;
        m.0[8] = -sin;
        m.0[10] = cos;
        m
    }

    /// Rotation about the Z axis, in degrees.
    pub fn rotation_z(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Self::identity();
        m.0[0] = cos;
        m.0[1] = -sin;
        m.0[4] = sin;
        m.0[5] = cos;
        m
    }

    /// Recover the affine transform whose images of the standard basis
    /// points `(0,0,0), (1,0,0), (0,1,0), (0,0,1)` are `p0..p3`.
    ///
    /// The columns of the linear block are `p1-p0, p2-p0, p3-p0` and the
    /// translation column is `p0`.
    pub fn from_basis_points(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let cx = p1.sub(&p0);
        let cy = p2.sub(&p0);
        let cz = p3.sub(&p0);
        Self([
            cx.x, cy.x, cz.x, p0.x, //
            cx.y, cy.y, cz.y, p0.y, //
            cx.z, cy.z, cz.z, p0.z,
        ])
    }

    /// Recover the affine transform mapping four arbitrary source points to
    /// four destination points, via a Cramer's-rule-style closed-form solve.
    ///
    /// For each world-space axis the four coefficients `[a, b, c, d]` with
    /// `a·srcX + b·srcY + c·srcZ + d = dstAxis` are obtained as signed
    /// cofactor determinants over the 4x4 source matrix (sign alternating
    /// by column index parity). The system is always exactly 4x4, so no
    /// general linear solver is needed.
    pub fn from_point_pairs(src: &[Vec3; 4], dst: &[Vec3; 4]) -> Self {
        // Rows: source X across points, source Y, source Z, then ones.
        let b = [
            [src[0].x, src[1].x, src[2].x, src[3].x],
            [src[0].y, src[1].y, src[2].y, src[3].y],
            [src[0].z, src[1].z, src[2].z, src[3].z],
            [1.0, 1.0, 1.0, 1.0],
        ];
        let inv_det = 1.0 / det4x4(&b);

        let mut m = [0.0; 12];
        for (axis, out) in m.chunks_mut(4).enumerate() {
            let row = [
                axis_component(dst[0], axis),
                axis_component(dst[1], axis),
                axis_component(dst[2], axis),
                axis_component(dst[3], axis),
            ];
            for (j, slot) in out.iter_mut().enumerate() {
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                *slot = sign * inv_det * replaced_det(&row, j, &b);
            }
        }
        Self(m)
    }

    /// Apply the transform to a point (implicit homogeneous coordinate 1).
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3 {
            x: m[0] * p.x + m[1] * p.y + m[2] * p.z + m[3],
            y: m[4] * p.x + m[5] * p.y + m[6] * p.z + m[7],
            z: m[8] * p.x + m[9] * p.y + m[10] * p.z + m[11],
        }
    }

    /// Compose two transforms: `self.compose(&other)` applies `other` first.
    pub fn compose(&self, other: &Matrix3x4) -> Matrix3x4 {
        let a = &self.0;
        let b = &other.0;
        let mut m = [0.0; 12];
        for row in 0..3 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += a[row * 4 + k] * b[k * 4 + col];
                }
                if col == 3 {
                    // b's implicit 4th row is [0, 0, 0, 1]
                    sum += a[row * 4 + 3];
                }
                m[row * 4 + col] = sum;
            }
        }
        Matrix3x4(m)
    }

    /// The translation column.
    pub fn translation_column(&self) -> Vec3 {
        Vec3::new(self.0[3], self.0[7], self.0[11])
    }
}

impl Default for Matrix3x4 {
    fn default() -> Self {
        Self::identity()
    }
}

fn axis_component(v: Vec3, axis: usize) -> f64 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Determinant of the 4x4 matrix obtained by replacing row `del_index` of
/// `b` with `row` and moving it to the top. The caller accounts for the row
/// swap parity.
fn replaced_det(row: &[f64; 4], del_index: usize, b: &[[f64; 4]; 4]) -> f64 {
    let mut m = [[0.0; 4]; 4];
    m[0] = *row;
    let mut out = 1;
    for (i, src) in b.iter().enumerate() {
        if i != del_index {
            m[out] = *src;
            out += 1;
        }
    }
    det4x4(&m)
}

// Adapted from gl-matrix's mat4.determinant.
fn det4x4(a: &[[f64; 4]; 4]) -> f64 {
    let (a00, a01, a02, a03) = (a[0][0], a[0][1], a[0][2], a[0][3]);
    let (a10, a11, a12, a13) = (a[1][0], a[1][1], a[1][2], a[1][3]);
    let (a20, a21, a22, a23) = (a[2][0], a[2][1], a[2][2], a[2][3]);
    let (a30, a31, a32, a33) = (a[3][0], a[3][1], a[3][2], a[3][3]);

    let b0 = a00 * a11 - a01 * a10;
    let b1 = a00 * a12 - a02 * a10;
    let b2 = a01 * a12 - a02 * a11;
    let b3 = a20 * a31 - a21 * a30;
    let b4 = a20 * a32 - a22 * a30;
    let b5 = a21 * a32 - a22 * a31;
    let b6 = a00 * b5 - a01 * b4 + a02 * b3;
    let b7 = a10 * b5 - a11 * b4 + a12 * b3;
    let b8 = a20 * b2 - a21 * b1 + a22 * b0;
    let b9 = a30 * b2 - a31 * b1 + a32 * b0;

    a13 * b6 - a03 * b7 + a33 * b8 - a23 * b9
}
