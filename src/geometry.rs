/// Non-indexed triangle list with one normal per vertex.
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

// Each face lists its corners counter-clockwise as seen from outside the cube.
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([1.0, 0.0, 0.0], [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]]),
    ([-1.0, 0.0, 0.0], [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]]),
    ([0.0, 1.0, 0.0], [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]]),
    ([0.0, -1.0, 0.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
    ([0.0, 0.0, 1.0], [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]),
    ([0.0, 0.0, -1.0], [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]]),
];

const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Unit cube spanning [0, 1] on every axis, two triangles per face.
pub fn cube() -> Mesh {
    let mut positions = Vec::with_capacity(CUBE_FACES.len() * QUAD_TRIANGLES.len() * 3);
    let mut normals = Vec::with_capacity(positions.capacity());

    for &(normal, corners) in CUBE_FACES.iter() {
        for &corner in QUAD_TRIANGLES.iter() {
            positions.extend_from_slice(&corners[corner]);
            normals.extend_from_slice(&normal);
        }
    }

    Mesh { positions, normals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::Vector3;

    fn vertex(data: &[f32], i: usize) -> Vector3<f32> {
        Vector3::new(data[i * 3], data[i * 3 + 1], data[i * 3 + 2])
    }

    #[test]
    fn cube_has_twelve_triangles() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.positions.len(), 108);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn positions_stay_inside_unit_cube() {
        let mesh = cube();
        assert!(mesh.positions.iter().all(|&c| c == 0.0 || c == 1.0));

        let sum = (0..mesh.vertex_count())
            .fold(Vector3::zeros(), |acc, i| acc + vertex(&mesh.positions, i));
        let centroid = sum / mesh.vertex_count() as f32;
        assert!((centroid - Vector3::new(0.5, 0.5, 0.5)).norm() < 1e-6);
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = cube();
        for i in 0..mesh.vertex_count() {
            assert!((vertex(&mesh.normals, i).norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let mesh = cube();
        for t in 0..mesh.vertex_count() / 3 {
            let a = vertex(&mesh.positions, t * 3);
            let b = vertex(&mesh.positions, t * 3 + 1);
            let c = vertex(&mesh.positions, t * 3 + 2);
            let face_normal = (b - a).cross(&(c - a)).normalize();

            for k in 0..3 {
                let n = vertex(&mesh.normals, t * 3 + k);
                assert!((face_normal - n).norm() < 1e-6, "triangle {} faces inward", t);
            }
        }
    }

    #[test]
    fn every_face_direction_is_covered_twice() {
        let mesh = cube();
        for &(normal, _) in CUBE_FACES.iter() {
            let n = Vector3::from(normal);
            let triangles = (0..mesh.vertex_count() / 3)
                .filter(|t| (vertex(&mesh.normals, t * 3) - n).norm() < 1e-6)
                .count();
            assert_eq!(triangles, 2);
        }
    }
}
