//! Drawing target used by the painter.

use raylib::prelude::{Color, Vector2};

use crate::error::RasterError;

/// Minimal 2D pixel surface.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: Color);
    /// Fill a polygon with a flat color. Fails on degenerate input without drawing.
    fn fill_polygon(&mut self, points: &[Vector2], color: Color) -> Result<(), RasterError>;
    fn draw_line(&mut self, from: Vector2, to: Vector2, color: Color);
    fn fill_circle(&mut self, center: Vector2, radius: f32, color: Color);
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);
}

/// Check a polygon before rasterizing it.
pub fn validate_polygon(points: &[Vector2]) -> Result<(), RasterError> {
    if points.len() < 3 {
        return Err(RasterError::TooFewVertices(points.len()));
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(RasterError::NonFinite);
    }
    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    if twice_area.abs() < 1e-6 {
        return Err(RasterError::Degenerate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(x: f32, y: f32) -> Vector2 {
        Vector2::new(x, y)
    }

    #[test]
    fn polygon_checks() {
        assert_eq!(validate_polygon(&[v(0.0, 0.0), v(1.0, 1.0)]), Err(RasterError::TooFewVertices(2)));
        assert_eq!(
            validate_polygon(&[v(0.0, 0.0), v(f32::NAN, 1.0), v(2.0, 0.0)]),
            Err(RasterError::NonFinite)
        );
        assert_eq!(
            validate_polygon(&[v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)]),
            Err(RasterError::Degenerate)
        );
        assert_eq!(validate_polygon(&[v(0.0, 0.0), v(4.0, 0.0), v(0.0, 3.0)]), Ok(()));
    }
}
