use bytemuck::{Pod, Zeroable};
use vantage_render::RenderError;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Built-in meshes by name.
pub fn builtin_mesh(name: &str) -> Result<MeshData, RenderError> {
    match name {
        "cube" => Ok(cube_mesh()),
        "plane" => Ok(plane_mesh()),
        other => Err(RenderError::MeshLoad {
            name: other.to_string(),
            reason: "no built-in mesh with that name (known: cube, plane)".into(),
        }),
    }
}

/// Unit cube centered on the origin, flat normals per face.
pub fn cube_mesh() -> MeshData {
    let p = 0.5_f32;
    let v = |position: [f32; 3], normal: [f32; 3]| Vertex { position, normal };
    #[rustfmt::skip]
    let vertices = vec![
        // +Z
        v([-p, -p,  p], [0.0, 0.0, 1.0]), v([ p, -p,  p], [0.0, 0.0, 1.0]),
        v([ p,  p,  p], [0.0, 0.0, 1.0]), v([-p,  p,  p], [0.0, 0.0, 1.0]),
        // -Z
        v([ p, -p, -p], [0.0, 0.0, -1.0]), v([-p, -p, -p], [0.0, 0.0, -1.0]),
        v([-p,  p, -p], [0.0, 0.0, -1.0]), v([ p,  p, -p], [0.0, 0.0, -1.0]),
        // +X
        v([ p, -p,  p], [1.0, 0.0, 0.0]), v([ p, -p, -p], [1.0, 0.0, 0.0]),
        v([ p,  p, -p], [1.0, 0.0, 0.0]), v([ p,  p,  p], [1.0, 0.0, 0.0]),
        // -X
        v([-p, -p, -p], [-1.0, 0.0, 0.0]), v([-p, -p,  p], [-1.0, 0.0, 0.0]),
        v([-p,  p,  p], [-1.0, 0.0, 0.0]), v([-p,  p, -p], [-1.0, 0.0, 0.0]),
        // +Y
        v([-p,  p,  p], [0.0, 1.0, 0.0]), v([ p,  p,  p], [0.0, 1.0, 0.0]),
        v([ p,  p, -p], [0.0, 1.0, 0.0]), v([-p,  p, -p], [0.0, 1.0, 0.0]),
        // -Y
        v([-p, -p, -p], [0.0, -1.0, 0.0]), v([ p, -p, -p], [0.0, -1.0, 0.0]),
        v([ p, -p,  p], [0.0, -1.0, 0.0]), v([-p, -p,  p], [0.0, -1.0, 0.0]),
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    MeshData { vertices, indices }
}

/// Unit square in the XZ plane facing +Y.
pub fn plane_mesh() -> MeshData {
    let p = 0.5_f32;
    let n = [0.0, 1.0, 0.0];
    MeshData {
        vertices: vec![
            Vertex { position: [-p, 0.0, p], normal: n },
            Vertex { position: [p, 0.0, p], normal: n },
            Vertex { position: [p, 0.0, -p], normal: n },
            Vertex { position: [-p, 0.0, -p], normal: n },
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Floor grid as a line list, with the X and Z axes tinted.
pub fn grid_lines(half_extent: i32, spacing: f32) -> Vec<LineVertex> {
    let plain = [0.4, 0.4, 0.4, 1.0];
    let x_axis = [0.8, 0.2, 0.2, 1.0];
    let z_axis = [0.2, 0.2, 0.8, 1.0];
    let extent = half_extent as f32 * spacing;

    let mut verts = Vec::with_capacity((half_extent as usize * 2 + 1) * 4);
    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        let (along_x, along_z) = if i == 0 { (x_axis, z_axis) } else { (plain, plain) };
        verts.push(LineVertex { position: [-extent, 0.0, offset], color: along_x });
        verts.push(LineVertex { position: [extent, 0.0, offset], color: along_x });
        verts.push(LineVertex { position: [offset, 0.0, -extent], color: along_z });
        verts.push(LineVertex { position: [offset, 0.0, extent], color: along_z });
    }
    verts
}
