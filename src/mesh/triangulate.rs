//! Ear-clipping triangulation of traced region outlines

use glam::Vec2;

use crate::outline::signed_area;

/// How a polygon ended up triangulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriangulationMethod {
    /// Every triangle is a clipped ear
    #[default]
    EarClip,
    /// Ear clipping got stuck and the remaining vertices were fanned
    FanFallback,
}

/// Triangle indices into the polygon's vertex list, three per triangle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triangulation {
    pub indices: Vec<u32>,
    pub method: TriangulationMethod,
}

impl Triangulation {
    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if any triangle came from the fan fallback
    #[inline]
    pub fn used_fallback(&self) -> bool {
        self.method == TriangulationMethod::FanFallback
    }
}

/// Triangulate a simple polygon by ear clipping
///
/// A trailing point equal to the first one is ignored. Triangles keep the
/// polygon's winding. When a pass finds no ear (degenerate or self-touching
/// outlines) the remaining vertices are fanned from the first one and the
/// result is flagged as [`TriangulationMethod::FanFallback`].
pub fn triangulate(points: &[Vec2]) -> Triangulation {
    let vertices = match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    };

    let mut triangulation = Triangulation::default();
    if vertices.len() < 3 {
        return triangulation;
    }

    let area = signed_area(vertices);
    let winding = if area > 0.0 {
        1.0
    } else if area < 0.0 {
        -1.0
    } else {
        0.0
    };

    let mut active: Vec<usize> = (0..vertices.len()).collect();
    let indices = &mut triangulation.indices;
    indices.reserve((vertices.len() - 2) * 3);

    while active.len() > 3 {
        let count = active.len();
        let ear = (0..count).find(|&i| {
            let prev = active[(i + count - 1) % count];
            let next = active[(i + 1) % count];
            is_ear(vertices, &active, prev, active[i], next, winding)
        });

        let Some(i) = ear else {
            for k in 1..count - 1 {
                push_triangle(indices, active[0], active[k], active[k + 1]);
            }
            triangulation.method = TriangulationMethod::FanFallback;
            return triangulation;
        };

        push_triangle(indices, active[(i + count - 1) % count], active[i], active[(i + 1) % count]);
        active.remove(i);
    }

    push_triangle(indices, active[0], active[1], active[2]);
    triangulation
}

/// Signed area of triangle (a, b, c); positive for counter-clockwise in y-up space
#[inline]
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a) * 0.5
}

fn push_triangle(indices: &mut Vec<u32>, a: usize, b: usize, c: usize) {
    indices.extend_from_slice(&[a as u32, b as u32, c as u32]);
}

fn is_ear(vertices: &[Vec2], active: &[usize], prev: usize, curr: usize, next: usize, winding: f32) -> bool {
    let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);

    // Reflex or flat corner
    if (b - a).perp_dot(c - b) * winding <= 0.0 {
        return false;
    }

    !active
        .iter()
        .filter(|&&v| v != prev && v != curr && v != next)
        .any(|&v| strictly_inside(vertices[v], a, b, c, winding))
}

fn strictly_inside(p: Vec2, a: Vec2, b: Vec2, c: Vec2, winding: f32) -> bool {
    (b - a).perp_dot(p - a) * winding > 0.0
        && (c - b).perp_dot(p - b) * winding > 0.0
        && (a - c).perp_dot(p - c) * winding > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{trace, RegionMask};
    use crate::partition::Partition;

    fn triangles_area(vertices: &[Vec2], triangulation: &Triangulation) -> f32 {
        triangulation
            .indices
            .chunks(3)
            .map(|t| triangle_area(vertices[t[0] as usize], vertices[t[1] as usize], vertices[t[2] as usize]))
            .sum()
    }

    fn v(points: &[(f32, f32)]) -> Vec<Vec2> {
        points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[test]
    fn test_too_few_vertices() {
        assert!(triangulate(&[]).indices.is_empty());
        assert!(triangulate(&v(&[(0.0, 0.0), (1.0, 0.0)])).indices.is_empty());
        // Closing duplicate does not count as a vertex
        assert!(triangulate(&v(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)])).indices.is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let triangulation = triangulate(&v(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]));
        assert_eq!(triangulation.indices, vec![0, 1, 2]);
        assert_eq!(triangulation.method, TriangulationMethod::EarClip);
    }

    #[test]
    fn test_square() {
        let square = v(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let triangulation = triangulate(&square);

        assert_eq!(triangulation.triangle_count(), 2);
        assert!(!triangulation.used_fallback());
        assert!((triangles_area(&square, &triangulation) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_traced_block_outline() {
        // Outline of a 3x3 block as the tracer emits it, closing point included
        let outline = v(&[
            (0.5, -0.5),
            (2.5, -0.5),
            (2.5, -2.5),
            (0.5, -2.5),
            (0.5, -1.5),
            (0.5, -0.5),
        ]);
        let triangulation = triangulate(&outline);

        assert_eq!(triangulation.indices, vec![4, 0, 1, 4, 1, 2, 2, 3, 4]);
        assert_eq!(triangulation.method, TriangulationMethod::EarClip);
        assert!((triangles_area(&outline, &triangulation) + 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_concave_polygon() {
        let u_shape = v(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        let triangulation = triangulate(&u_shape);

        assert_eq!(triangulation.method, TriangulationMethod::EarClip);
        assert_eq!(triangulation.triangle_count(), u_shape.len() - 2);
        assert!((triangles_area(&u_shape, &triangulation) - signed_area(&u_shape)).abs() < 1e-5);
        // Every clipped triangle keeps the polygon's winding
        for t in triangulation.indices.chunks(3) {
            let area = triangle_area(u_shape[t[0] as usize], u_shape[t[1] as usize], u_shape[t[2] as usize]);
            assert!(area > 0.0);
        }
    }

    #[test]
    fn test_collinear_falls_back_to_fan() {
        let line = v(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let triangulation = triangulate(&line);

        assert_eq!(triangulation.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(triangulation.used_fallback());
        assert_eq!(triangles_area(&line, &triangulation), 0.0);
    }

    #[test]
    fn test_pinched_outline_falls_back_to_fan() {
        // Clockwise lobe and a smaller counter-clockwise lobe meeting at the origin
        let pinched = v(&[
            (0.0, 0.0),
            (0.0, 4.0),
            (4.0, 4.0),
            (4.0, 0.0),
            (0.0, 0.0),
            (-1.0, 0.0),
            (-1.0, -1.0),
            (0.0, -1.0),
        ]);
        assert_eq!(signed_area(&pinched), -15.0);

        let triangulation = triangulate(&pinched);

        // The clockwise lobe is clipped, the leftover counter-clockwise loop has no ear
        assert_eq!(triangulation.method, TriangulationMethod::FanFallback);
        assert_eq!(
            triangulation.indices,
            vec![0, 1, 2, 7, 0, 2, 7, 2, 3, 3, 4, 5, 3, 5, 6, 3, 6, 7]
        );
        assert!((triangles_area(&pinched, &triangulation) + 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_traced_regions_hit_fan_fallback() {
        let partition = Partition::build(80, 30, 20, 10, 709248357, 2, 3).unwrap();

        let fallbacks: Vec<usize> = (0..partition.region_count())
            .filter(|&id| {
                let polygon = trace(&RegionMask::extract(&partition, id).unwrap());
                polygon.vertices().len() >= 3 && triangulate(&polygon.points).used_fallback()
            })
            .collect();

        assert!(!fallbacks.is_empty());
        for id in fallbacks {
            let polygon = trace(&RegionMask::extract(&partition, id).unwrap());
            let vertices = polygon.vertices();
            let triangulation = triangulate(&polygon.points);

            assert_eq!(triangulation.triangle_count(), vertices.len() - 2);
            let expected = signed_area(vertices);
            let actual = triangles_area(vertices, &triangulation);
            assert!(
                (expected - actual).abs() <= 1e-3 * expected.abs().max(1.0),
                "region {}: {} vs {}",
                id,
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_area_law_on_traced_regions() {
        let partition = Partition::build(80, 30, 20, 10, 709248357, 2, 3).unwrap();

        for id in 0..partition.region_count() {
            let polygon = trace(&RegionMask::extract(&partition, id).unwrap());
            let vertices = polygon.vertices();
            if vertices.len() < 3 {
                continue;
            }

            let triangulation = triangulate(&polygon.points);
            assert_eq!(triangulation.indices.len() % 3, 0);
            assert!(triangulation.indices.iter().all(|&i| (i as usize) < vertices.len()));

            let expected = signed_area(vertices);
            let actual = triangles_area(vertices, &triangulation);
            assert!(
                (expected - actual).abs() <= 1e-3 * expected.abs().max(1.0),
                "region {}: {} vs {}",
                id,
                expected,
                actual
            );
        }
    }
}
