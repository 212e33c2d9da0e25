//! Triangulation input for boundary edge extraction

use crate::{Error, Result};
use glam::Vec3;

#[cfg(feature = "std")]
use std::fs::File;
#[cfg(feature = "std")]
use std::io::{BufRead, BufReader};
#[cfg(feature = "std")]
use std::path::Path;

/// A baked navigation surface as a triangle soup
///
/// Vertices are stored as a flat `[x, y, z, x, y, z, ...]` array and indices
/// as a flat array with three entries per triangle, mirroring how navmesh
/// triangulations are handed out by bakers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Triangulation {
    /// Flat vertex positions
    pub vertices: Vec<f32>,
    /// Triangle vertex indices, stride 3
    pub indices: Vec<i32>,
}

impl Triangulation {
    /// Creates an empty triangulation
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a triangulation from flat arrays without validating them
    pub fn from_raw(vertices: Vec<f32>, indices: Vec<i32>) -> Self {
        Self { vertices, indices }
    }

    /// Creates a triangulation from positions and index triples
    pub fn from_positions(positions: &[Vec3], triangles: &[[i32; 3]]) -> Self {
        let vertices = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let indices = triangles.iter().flatten().copied().collect();
        Self { vertices, indices }
    }

    /// Number of complete vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the position of a vertex, or `None` if out of range
    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        let base = index.checked_mul(3)?;
        let xyz = self.vertices.get(base..base + 3)?;
        Some(Vec3::new(xyz[0], xyz[1], xyz[2]))
    }

    /// Returns the three corner positions of a triangle
    pub fn triangle(&self, tri: usize) -> Result<[Vec3; 3]> {
        let base = tri * 3;
        let corners = self.indices.get(base..base + 3).ok_or_else(|| {
            Error::InvalidTriangulation(format!(
                "triangle {} out of range ({} triangles)",
                tri,
                self.triangle_count()
            ))
        })?;

        let mut out = [Vec3::ZERO; 3];
        for (slot, &index) in out.iter_mut().zip(corners) {
            *slot = usize::try_from(index)
                .ok()
                .and_then(|i| self.vertex(i))
                .ok_or_else(|| {
                    Error::InvalidTriangulation(format!(
                        "triangle {} references vertex {} (max: {})",
                        tri,
                        index,
                        self.vertex_count() as i64 - 1
                    ))
                })?;
        }
        Ok(out)
    }

    /// All vertex positions in order
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect()
    }

    /// Checks stride and index bounds
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(Error::InvalidTriangulation(
                "vertex array length must be a multiple of 3".to_string(),
            ));
        }

        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidTriangulation(
                "index array length must be a multiple of 3".to_string(),
            ));
        }

        let vert_count = self.vertex_count();
        if let Some(bad) = self
            .indices
            .iter()
            .find(|&&i| i < 0 || i as usize >= vert_count)
        {
            return Err(Error::InvalidTriangulation(format!(
                "index {} out of bounds (vertex count: {})",
                bad, vert_count
            )));
        }

        Ok(())
    }

    /// Axis-aligned bounds of all vertices, `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.positions().into_iter();
        let first = positions.next()?;
        Some(positions.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Loads a triangulation from an OBJ file
    #[cfg(feature = "std")]
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut mesh = Self::new();
        for (number, line) in reader.lines().enumerate() {
            mesh.parse_obj_line(&line?, number + 1)?;
        }
        Ok(mesh)
    }

    /// Parses OBJ content from a string
    ///
    /// Only `v` and `f` records are read; polygons are fan-triangulated.
    ///
    /// # Example
    ///
    /// ```
    /// use navlink_common::Triangulation;
    ///
    /// let obj = "v 0 0 0\nv 1 0 0\nv 1 0 1\nv 0 0 1\nf 1 2 3 4\n";
    /// let mesh = Triangulation::from_obj_str(obj).unwrap();
    /// assert_eq!(mesh.vertex_count(), 4);
    /// assert_eq!(mesh.triangle_count(), 2);
    /// ```
    pub fn from_obj_str(content: &str) -> Result<Self> {
        let mut mesh = Self::new();
        for (number, line) in content.lines().enumerate() {
            mesh.parse_obj_line(line, number + 1)?;
        }
        Ok(mesh)
    }

    fn parse_obj_line(&mut self, line: &str, number: usize) -> Result<()> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                for axis in ["x", "y", "z"] {
                    let value = tokens
                        .next()
                        .and_then(|t| t.parse::<f32>().ok())
                        .ok_or_else(|| {
                            Error::InvalidTriangulation(format!(
                                "line {}: vertex has no valid {} coordinate",
                                number, axis
                            ))
                        })?;
                    self.vertices.push(value);
                }
            }
            Some("f") => {
                let face = tokens
                    .map(|t| {
                        t.split('/')
                            .next()
                            .and_then(|i| i.parse::<i32>().ok())
                            .map(|i| self.resolve_obj_index(i))
                            .ok_or_else(|| {
                                Error::InvalidTriangulation(format!(
                                    "line {}: bad face index '{}'",
                                    number, t
                                ))
                            })
                    })
                    .collect::<Result<Vec<i32>>>()?;

                if face.len() < 3 {
                    return Err(Error::InvalidTriangulation(format!(
                        "line {}: face has fewer than 3 vertices",
                        number
                    )));
                }

                for pair in face[1..].windows(2) {
                    self.indices.extend_from_slice(&[face[0], pair[0], pair[1]]);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// OBJ indices are 1-based; negative indices count back from the last vertex
    fn resolve_obj_index(&self, index: i32) -> i32 {
        if index < 0 {
            self.vertex_count() as i32 + index
        } else {
            index - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Triangulation {
        Triangulation::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_from_positions() {
        let mesh = unit_quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex(2), Some(Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(mesh.vertex(4), None);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_triangle_lookup() -> Result<()> {
        let mesh = unit_quad();
        let [a, b, c] = mesh.triangle(1)?;
        assert_eq!(a, Vec3::ZERO);
        assert_eq!(b, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(c, Vec3::new(0.0, 0.0, 1.0));
        assert!(mesh.triangle(2).is_err());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_stride() {
        let mesh = Triangulation::from_raw(vec![0.0; 8], vec![0, 1, 2]);
        assert!(matches!(
            mesh.validate(),
            Err(Error::InvalidTriangulation(_))
        ));

        let mesh = Triangulation::from_raw(vec![0.0; 9], vec![0, 1]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_index() {
        let mut mesh = unit_quad();
        mesh.indices[4] = 9;
        assert!(mesh.validate().is_err());

        mesh.indices[4] = -1;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_bounds() {
        let (lo, hi) = unit_quad().bounds().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 0.0, 1.0));
        assert!(Triangulation::new().bounds().is_none());
    }

    #[test]
    fn test_from_obj_str_fan_triangulates() {
        let obj = r#"
# pentagon
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.5 0.0 1.0
v 0.5 0.0 1.5
v -0.5 0.0 1.0
vn 0.0 1.0 0.0
f 1//1 2//1 3//1 4//1 5//1
"#;
        let mesh = Triangulation::from_obj_str(obj).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn test_from_obj_str_negative_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 0 1\nf -3 -2 -1\n";
        let mesh = Triangulation::from_obj_str(obj).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_from_obj_str_errors() {
        assert!(Triangulation::from_obj_str("v 0.0 0.0").is_err());
        assert!(Triangulation::from_obj_str("v 0 0 0\nv 1 0 0\nf 1 2").is_err());
        assert!(Triangulation::from_obj_str("f 1 a 3").is_err());
    }

    #[test]
    fn test_from_obj_file() -> Result<()> {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "v 0 0 0")?;
        writeln!(file, "v 2 0 0")?;
        writeln!(file, "v 0 0 2")?;
        writeln!(file, "f 1 2 3")?;

        let mesh = Triangulation::from_obj(file.path())?;
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex(1), Some(Vec3::new(2.0, 0.0, 0.0)));
        Ok(())
    }
}
