//! Geometry generators that append well-known shapes to a [`Mesh`].
//!
//! Every primitive is unit sized (diameter or edge length 1, centred on the origin) and is placed
//! through [`PrimitiveStyle::transform`]. Generators assemble the shape in a scratch mesh and append
//! it in one step, so a failing call leaves the target mesh unchanged.

use std::collections::HashMap;
use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::{rotation_about_y, rotation_to_align_x_to_axis, translate};
use crate::geometry::vertex_buffer::VertexLayout;
use crate::scene::camera::Camera;
use crate::scene::mesh::Mesh;

/// Shared parameters of the primitive generators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimitiveStyle {
    /// Vertex color; required for per-vertex-colored meshes, ignored by textured meshes.
    pub color: Option<Color>,
    /// Placement of the unit primitive.
    pub transform: Mat4,
    /// Emit triangles.
    pub fill_triangles: bool,
    /// Emit outline lines.
    pub add_wireframe: bool,
}

impl Default for PrimitiveStyle {
    fn default() -> Self {
        Self {
            color: None,
            transform: Mat4::IDENTITY,
            fill_triangles: true,
            add_wireframe: false,
        }
    }
}

impl PrimitiveStyle {
    /// Default style with a vertex color.
    pub fn colored(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Placement of the primitive.
    pub fn transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Toggle triangle output.
    pub fn fill_triangles(mut self, value: bool) -> Self {
        self.fill_triangles = value;
        self
    }

    /// Toggle outline output.
    pub fn wireframe(mut self, value: bool) -> Self {
        self.add_wireframe = value;
        self
    }
}

fn triangle_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

fn check_count(what: &str, value: u32, min: u32) -> SceneResult<()> {
    if value < min {
        return Err(SceneError::validation(format!(
            "{what} must be >= {min}, got {value}"
        )));
    }
    Ok(())
}

/// Scratch geometry plus the outline edges requested by the generator.
struct Part {
    mesh: Mesh,
    color: Color,
    outline: Vec<[u32; 2]>,
}

impl Part {
    fn vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        self.mesh
            .push_vertex(position, normal, self.color, [0.0, 0.0])
    }

    fn vertex_uv(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        self.mesh.push_vertex(position, normal, self.color, uv)
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.mesh.push_triangle(a, b, c);
    }

    fn edge(&mut self, a: u32, b: u32) {
        self.outline.push([a, b]);
    }

    fn quad(&mut self, p: [Vec3; 4], uvs: [[f32; 2]; 4]) {
        let normal = triangle_normal(p[0], p[1], p[2]);
        let i: Vec<u32> = p
            .iter()
            .zip(uvs)
            .map(|(&p, uv)| self.vertex_uv(p, normal, uv))
            .collect();
        self.triangle(i[0], i[1], i[2]);
        self.triangle(i[0], i[2], i[3]);
        for k in 0..4 {
            self.edge(i[k], i[(k + 1) % 4]);
        }
    }
}

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Corners of an axis-aligned box along x, `half_start`/`half_end` being the half thickness at
/// each end.
fn box_corners(half_length: f32, half_start: f32, half_end: f32) -> [Vec3; 8] {
    let (l, s, e) = (half_length, half_start, half_end);
    [
        Vec3::new(-l, -s, -s),
        Vec3::new(l, -e, -e),
        Vec3::new(-l, s, -s),
        Vec3::new(l, e, -e),
        Vec3::new(-l, -s, s),
        Vec3::new(l, -e, e),
        Vec3::new(-l, s, s),
        Vec3::new(l, e, e),
    ]
}

fn add_box_faces(part: &mut Part, p: [Vec3; 8]) {
    for face in [
        [0, 2, 3, 1],
        [1, 3, 7, 5],
        [5, 7, 6, 4],
        [4, 6, 2, 0],
        [2, 6, 7, 3],
        [4, 0, 1, 5],
    ] {
        part.quad(face.map(|i| p[i]), [[0.0, 0.0]; 4]);
    }
}

impl Mesh {
    fn begin_part(&self, style: &PrimitiveStyle) -> SceneResult<Part> {
        self.check_not_instanced("add primitives")?;
        let color = self.vertex_color(style.color)?;
        Ok(Part {
            mesh: self.scratch(),
            color,
            outline: Vec::new(),
        })
    }

    fn finish_part(&mut self, part: Part, style: &PrimitiveStyle) -> SceneResult<()> {
        let Part {
            mut mesh, outline, ..
        } = part;
        if style.add_wireframe {
            if outline.is_empty() {
                mesh.add_wireframe();
            } else {
                mesh.lines.extend(outline);
            }
        }
        if !style.fill_triangles {
            mesh.triangles.clear();
        }
        mesh.apply_transform(style.transform);
        self.append_mesh(&mesh)
    }

    /// Single triangle; the normal follows the winding `p0 -> p1 -> p2`.
    pub fn add_triangle(
        &mut self,
        points: [Vec3; 3],
        uvs: Option<[[f32; 2]; 3]>,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        let mut part = self.begin_part(style)?;
        let normal = triangle_normal(points[0], points[1], points[2]);
        let uvs = uvs.unwrap_or([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let i0 = part.vertex_uv(points[0], normal, uvs[0]);
        let i1 = part.vertex_uv(points[1], normal, uvs[1]);
        let i2 = part.vertex_uv(points[2], normal, uvs[2]);
        part.triangle(i0, i1, i2);
        part.edge(i0, i1);
        part.edge(i1, i2);
        part.edge(i2, i0);
        self.finish_part(part, style)
    }

    /// Planar quad split along the `p0 - p2` diagonal.
    pub fn add_quad(
        &mut self,
        points: [Vec3; 4],
        uvs: Option<[[f32; 2]; 4]>,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        let mut part = self.begin_part(style)?;
        part.quad(points, uvs.unwrap_or(QUAD_UVS));
        self.finish_part(part, style)
    }

    /// Unit cube, one quad per face so faces keep flat normals.
    pub fn add_cube(&mut self, style: &PrimitiveStyle) -> SceneResult<()> {
        let mut part = self.begin_part(style)?;
        add_box_faces(&mut part, box_corners(0.5, 0.5, 0.5));
        self.finish_part(part, style)
    }

    /// Square-section beam from `start` to `end`, tapering between the two thicknesses.
    pub fn add_thickline(
        &mut self,
        start: Vec3,
        end: Vec3,
        start_thickness: f32,
        end_thickness: f32,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        let valid = |t: f32| t.is_finite() && t >= 0.0;
        if !valid(start_thickness) || !valid(end_thickness) {
            return Err(SceneError::validation(
                "thickline thickness must be finite and >= 0",
            ));
        }
        let mut part = self.begin_part(style)?;
        let axis = end - start;
        add_box_faces(
            &mut part,
            box_corners(
                axis.length() * 0.5,
                start_thickness * 0.5,
                end_thickness * 0.5,
            ),
        );
        let placement = translate((start + end) * 0.5) * rotation_to_align_x_to_axis(axis);
        let style = PrimitiveStyle {
            transform: style.transform * placement,
            ..*style
        };
        self.finish_part(part, &style)
    }

    /// Cone with its apex at `x = -0.5` and a unit-diameter base at `x = +0.5`.
    ///
    /// `truncation_height < 1` cuts the cone short of the apex.
    pub fn add_cone(
        &mut self,
        truncation_height: f32,
        lat_count: u32,
        long_count: u32,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        check_count("cone lat_count", lat_count, 1)?;
        check_count("cone long_count", long_count, 3)?;
        if !(truncation_height > 0.0 && truncation_height <= 1.0) {
            return Err(SceneError::validation(
                "cone truncation_height must be in (0, 1]",
            ));
        }
        let mut part = self.begin_part(style)?;
        let radius = 0.5f32;
        let apex = Vec3::new(-0.5, 0.0, 0.0);
        let add_apex = (truncation_height - 1.0).abs() < 1e-6;

        for lat in 0..lat_count {
            let alpha = lat as f32 / lat_count as f32 * truncation_height;
            for long in 0..long_count {
                let phi = long as f32 * 2.0 * PI / long_count as f32;
                let (sin, cos) = phi.sin_cos();
                let base = Vec3::new(0.5, cos * radius, sin * radius);
                let normal = Vec3::new(-radius, cos, sin);
                part.vertex(apex.lerp(base, 1.0 - alpha), normal);
            }
        }
        let apex_index = add_apex.then(|| part.vertex(apex, Vec3::NEG_X));

        for lat in 0..lat_count - 1 {
            let ring = lat * long_count;
            for long in 0..long_count {
                let next = (long + 1) % long_count;
                let (a, b) = (ring + long, ring + next);
                let (c, d) = (a + long_count, ring + next + long_count);
                part.triangle(b, a, c);
                part.triangle(b, c, d);
                part.edge(a, b);
                part.edge(b, d);
                part.edge(d, c);
                part.edge(c, a);
            }
        }
        if let Some(tip) = apex_index {
            let ring = (lat_count - 1) * long_count;
            for long in 0..long_count {
                let b = ring + long;
                let c = ring + (long + 1) % long_count;
                part.triangle(b, tip, c);
                part.edge(tip, b);
            }
        }
        self.finish_part(part, style)
    }

    /// Unit-diameter disc in the `yz` plane facing `+x`.
    pub fn add_disc(&mut self, segment_count: u32, style: &PrimitiveStyle) -> SceneResult<()> {
        check_count("disc segment_count", segment_count, 3)?;
        let mut part = self.begin_part(style)?;
        let center = part.vertex(Vec3::ZERO, Vec3::X);
        for i in 0..segment_count {
            let theta = i as f32 * 2.0 * PI / segment_count as f32;
            let (sin, cos) = theta.sin_cos();
            part.vertex(Vec3::new(0.0, 0.5 * cos, 0.5 * sin), Vec3::X);
        }
        for i in 0..segment_count {
            let prev = (i + segment_count - 1) % segment_count;
            part.triangle(center, prev + 1, i + 1);
        }
        self.finish_part(part, style)
    }

    /// Capped unit cylinder along `x`.
    pub fn add_cylinder(&mut self, segment_count: u32, style: &PrimitiveStyle) -> SceneResult<()> {
        check_count("cylinder segment_count", segment_count, 3)?;
        let mut part = self.begin_part(style)?;
        let n = segment_count;
        for x in [-0.5f32, 0.5] {
            let angle = if x > 0.0 { 0.0 } else { PI };
            let cap = translate(Vec3::new(x, 0.0, 0.0)) * rotation_about_y(angle);
            let normal = cap.transform_vector3(Vec3::X);
            let center = part.vertex(cap.transform_point3(Vec3::ZERO), normal);
            for i in 0..n {
                let theta = i as f32 * 2.0 * PI / n as f32;
                let (sin, cos) = theta.sin_cos();
                let p = cap.transform_point3(Vec3::new(0.0, 0.5 * cos, 0.5 * sin));
                part.vertex(p, normal);
            }
            for i in 0..n {
                let prev = (i + n - 1) % n;
                part.triangle(center, center + 1 + prev, center + 1 + i);
            }
        }

        let barrel = part.mesh.vertex_count() as u32;
        for x in [-0.5f32, 0.5] {
            for i in 0..n {
                let theta = i as f32 * 2.0 * PI / n as f32;
                let (sin, cos) = theta.sin_cos();
                part.vertex(Vec3::new(x, 0.5 * cos, 0.5 * sin), Vec3::new(0.0, cos, sin));
            }
        }
        for i in 0..n {
            let prev = (i + n - 1) % n;
            part.triangle(barrel + prev, barrel + i, barrel + i + n);
            part.triangle(barrel + prev, barrel + i + n, barrel + prev + n);
        }
        self.finish_part(part, style)
    }

    /// Icosphere with two subdivision steps.
    pub fn add_sphere(&mut self, style: &PrimitiveStyle) -> SceneResult<()> {
        self.add_icosphere(2, style)
    }

    /// Unit-diameter sphere from a subdivided icosahedron.
    ///
    /// Textured meshes get equirectangular uvs; vertices on the longitude seam are duplicated.
    pub fn add_icosphere(&mut self, steps: u32, style: &PrimitiveStyle) -> SceneResult<()> {
        let mut part = self.begin_part(style)?;
        let (mut positions, mut triangles) = icosphere(steps);

        if self.layout() == VertexLayout::Textured {
            let mut uvs: Vec<[f32; 2]> = positions.iter().map(|&p| sphere_uv(p)).collect();
            for tri in &mut triangles {
                let [mut a, mut b, mut c] = *tri;
                for _ in 0..2 {
                    let ua = uvs[a as usize][0];
                    if ua < uvs[b as usize][0] || ua < uvs[c as usize][0] {
                        (a, b, c) = (b, c, a);
                    }
                }
                let a_east = uvs[a as usize][0] > 0.66;
                for v in [&mut c, &mut b] {
                    if a_east && uvs[*v as usize][0] < 0.33 {
                        let [u, w] = uvs[*v as usize];
                        positions.push(positions[*v as usize]);
                        uvs.push([1.0 + u, w]);
                        *v = positions.len() as u32 - 1;
                    }
                }
                *tri = [a, b, c];
            }
            for (&p, &uv) in positions.iter().zip(&uvs) {
                part.vertex_uv(p, p, uv);
            }
        } else {
            for &p in &positions {
                part.vertex(p, p);
            }
        }
        for [a, b, c] in triangles {
            part.triangle(a, b, c);
        }
        self.finish_part(part, style)
    }

    /// Unit-diameter latitude/longitude sphere.
    pub fn add_uv_sphere(
        &mut self,
        lat_count: u32,
        long_count: u32,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        check_count("uv sphere lat_count", lat_count, 2)?;
        check_count("uv sphere long_count", long_count, 3)?;
        let mut part = self.begin_part(style)?;
        let radius = 0.5f64;
        for lat in 0..=lat_count {
            let theta = lat as f64 * std::f64::consts::PI / lat_count as f64;
            let (sin_t, cos_t) = theta.sin_cos();
            for long in 0..long_count {
                let phi = long as f64 * 2.0 * std::f64::consts::PI / long_count as f64;
                let (sin_p, cos_p) = phi.sin_cos();
                let p = Vec3::new(
                    (radius * cos_p * sin_t) as f32,
                    (radius * cos_t) as f32,
                    (radius * sin_p * sin_t) as f32,
                );
                part.vertex(p, p);
            }
        }
        for lat in 0..lat_count {
            let ring = lat * long_count;
            for long in 0..long_count {
                let next = (long + 1) % long_count;
                let (a, b) = (ring + long, ring + next);
                let (c, d) = (a + long_count, ring + next + long_count);
                if lat > 0 {
                    part.triangle(a, b, c);
                }
                if lat + 1 < lat_count {
                    part.triangle(c, b, d);
                }
                part.edge(a, b);
                part.edge(b, d);
                part.edge(d, c);
                part.edge(c, a);
            }
        }
        self.finish_part(part, style)
    }

    /// Red/green/blue beams along `x`/`y`/`z` with a white hub.
    ///
    /// A shared-color mesh is converted to per-vertex colors first; textured meshes are rejected.
    pub fn add_coordinate_axes(
        &mut self,
        length: f32,
        thickness: f32,
        transform: Mat4,
    ) -> SceneResult<()> {
        self.check_not_instanced("add coordinate axes")?;
        if self.layout() == VertexLayout::Textured {
            return Err(SceneError::validation(format!(
                "cannot add coordinate axes to textured mesh '{}'",
                self.mesh_id
            )));
        }
        let mut axes = Mesh::new("");
        for (axis, color) in [(Vec3::X, Color::RED), (Vec3::Y, Color::GREEN), (Vec3::Z, Color::BLUE)] {
            axes.add_thickline(
                Vec3::ZERO,
                axis * length,
                thickness,
                0.5 * thickness,
                &PrimitiveStyle::colored(color),
            )?;
        }
        axes.add_sphere(
            &PrimitiveStyle::colored(Color::WHITE)
                .transform(Mat4::from_scale(Vec3::splat(thickness * 1.1))),
        )?;
        axes.apply_transform(transform);

        self.convert_to_vertex_colors()?;
        self.append_mesh(&axes)
    }

    /// Wireframe pyramid showing the view volume of `camera` out to `depth`, placed in world
    /// space by the camera pose.
    pub fn add_camera_frustum(
        &mut self,
        camera: &Camera,
        depth: f32,
        thickness: f32,
        style: &PrimitiveStyle,
    ) -> SceneResult<()> {
        self.check_not_instanced("add a camera frustum")?;
        camera.validate()?;
        let unprojection = camera.projection().inverse();
        let corner = |x: f32, y: f32| {
            unprojection
                .project_point3(Vec3::new(x, y, 1.0))
                .normalize_or_zero()
                * depth
        };
        let corners = [
            corner(1.0, 1.0),
            corner(1.0, -1.0),
            corner(-1.0, -1.0),
            corner(-1.0, 1.0),
        ];
        let edge_style = PrimitiveStyle {
            transform: Mat4::IDENTITY,
            ..*style
        };

        let mut frustum = self.scratch();
        for (i, &c) in corners.iter().enumerate() {
            frustum.add_thickline(Vec3::ZERO, c, 0.4 * thickness, thickness, &edge_style)?;
            frustum.add_thickline(c, corners[(i + 1) % 4], thickness, thickness, &edge_style)?;
        }
        frustum.apply_transform(style.transform * camera.camera_to_world());
        self.append_mesh(&frustum)
    }

    /// Independent line segments; no triangles are emitted.
    pub fn add_lines(&mut self, segments: &[(Vec3, Vec3)], style: &PrimitiveStyle) -> SceneResult<()> {
        let mut part = self.begin_part(style)?;
        for &(start, end) in segments {
            let a = part.vertex(start, Vec3::X);
            let b = part.vertex(end, Vec3::X);
            part.mesh.push_line(a, b);
        }
        part.mesh.apply_transform(style.transform);
        self.append_mesh(&part.mesh)
    }

    /// Textured rectangle spanning `origin`, `origin + x_axis` and `origin + y_axis`.
    ///
    /// `double_sided` adds a back face with flipped winding and normals.
    pub fn add_image(
        &mut self,
        origin: Vec3,
        x_axis: Vec3,
        y_axis: Vec3,
        double_sided: bool,
        transform: Mat4,
    ) -> SceneResult<()> {
        if self.texture_id().is_none() {
            return Err(SceneError::invalid_state(format!(
                "mesh '{}' needs a texture before adding an image",
                self.mesh_id
            )));
        }
        let style = PrimitiveStyle::default().transform(transform);
        let mut part = self.begin_part(&style)?;
        let p = [origin, origin + x_axis, origin + x_axis + y_axis, origin + y_axis];
        part.quad(p, QUAD_UVS);
        if double_sided {
            let normal = -triangle_normal(p[0], p[1], p[2]);
            let i: Vec<u32> = p
                .iter()
                .zip(QUAD_UVS)
                .map(|(&p, uv)| part.vertex_uv(p, normal, uv))
                .collect();
            part.triangle(i[0], i[2], i[1]);
            part.triangle(i[0], i[3], i[2]);
        }
        self.finish_part(part, &style)
    }
}

/// Icosahedron of diameter 1, subdivided `steps` times by edge midpoints pushed to the sphere.
pub(crate) fn icosphere(steps: u32) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let t = 0.5 * (1.0 + 5.0f32.sqrt());
    let mut positions: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize() * 0.5)
    .collect();
    let mut triangles: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..steps {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let p = (positions[a as usize] + positions[b as usize]).normalize() * 0.5;
                positions.push(p);
                positions.len() as u32 - 1
            })
        };
        let mut refined = Vec::with_capacity(triangles.len() * 4);
        for &[a, b, c] in &triangles {
            let ab = midpoint(a, b, &mut positions);
            let ac = midpoint(a, c, &mut positions);
            let bc = midpoint(b, c, &mut positions);
            refined.push([a, ab, ac]);
            refined.push([ab, bc, ac]);
            refined.push([ac, bc, c]);
            refined.push([ab, b, bc]);
        }
        triangles = refined;
    }
    (positions, triangles)
}

fn sphere_uv(p: Vec3) -> [f32; 2] {
    let u = 0.5 - 0.5 * p.z.atan2(p.x) / PI;
    let v = 1.0 - (p.y * 2.0).clamp(-1.0, 1.0).acos() / PI;
    [u, v]
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/primitives.rs"]
mod tests;
