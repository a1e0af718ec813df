use ember_engine::Vertex;
use glam::Vec3;

/// Two triangles covering the quad `a b c d` (counter-clockwise seen from
/// the front), with the texture spanning it once.
fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> [Vertex; 6] {
    let v = |p: Vec3, uv: [f32; 2]| Vertex::new(p.to_array(), uv);
    [
        v(a, [0.0, 1.0]),
        v(b, [1.0, 1.0]),
        v(c, [1.0, 0.0]),
        v(a, [0.0, 1.0]),
        v(c, [1.0, 0.0]),
        v(d, [0.0, 0.0]),
    ]
}

/// Axis-aligned cube centered on the origin, one textured quad per face.
pub fn cube(half_extent: f32) -> Vec<Vertex> {
    let h = half_extent;
    let p = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);

    let faces = [
        // +z, -z
        quad(p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)),
        quad(p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)),
        // +x, -x
        quad(p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)),
        quad(p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)),
        // +y, -y
        quad(p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)),
        quad(p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)),
    ];

    faces.into_iter().flatten().collect()
}
