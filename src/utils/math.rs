use crate::core::gfx::types::Rect;
use cgmath::{Deg, Matrix3, Vector2, Vector3};

// 2D affine transforms as homogeneous 3x3 matrices (column vectors).
// `post_*` helpers apply the new transform *after* the existing one,
// i.e. `m' = op * m`.

#[inline(always)]
pub fn translation(dx: f32, dy: f32) -> Matrix3<f32> {
    Matrix3::from_translation(Vector2::new(dx, dy))
}

#[inline(always)]
pub fn post_translate(m: Matrix3<f32>, dx: f32, dy: f32) -> Matrix3<f32> {
    translation(dx, dy) * m
}

/// Rotates `deg` degrees clockwise on a y-down screen about `(px, py)`.
pub fn post_rotate_about(m: Matrix3<f32>, deg: f32, px: f32, py: f32) -> Matrix3<f32> {
    let r = Matrix3::from_angle_z(Deg(deg));
    translation(px, py) * r * translation(-px, -py) * m
}

#[inline(always)]
pub fn map_point(m: &Matrix3<f32>, x: f32, y: f32) -> (f32, f32) {
    let p = *m * Vector3::new(x, y, 1.0);
    (p.x, p.y)
}

/// Axis-aligned bounding box of `r` after transformation.
pub fn map_rect(m: &Matrix3<f32>, r: &Rect) -> Rect {
    let corners = [
        map_point(m, r.left, r.top),
        map_point(m, r.right, r.top),
        map_point(m, r.right, r.bottom),
        map_point(m, r.left, r.bottom),
    ];
    let mut out = Rect::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for (x, y) in corners {
        out.left = out.left.min(x);
        out.top = out.top.min(y);
        out.right = out.right.max(x);
        out.bottom = out.bottom.max(y);
    }
    out
}

/// Row-major copy of `m` for serialization.
pub fn to_rows(m: &Matrix3<f32>) -> [[f32; 3]; 3] {
    // cgmath stores columns: m.x, m.y, m.z
    [
        [m.x.x, m.y.x, m.z.x],
        [m.x.y, m.y.y, m.z.y],
        [m.x.z, m.y.z, m.z.z],
    ]
}
