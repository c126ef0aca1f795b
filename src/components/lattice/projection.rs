//! Hand-rolled perspective projection. There is no depth buffer; callers sort
//! by [`Projected::depth`] and paint back to front.

/// Distance from the eye to the projection plane.
pub const FOCAL_LENGTH: f64 = 900.0;
/// Floor on camera depth so points passing the eye never flip or blow up.
pub const MIN_CAMERA_DEPTH: f64 = 10.0;
/// Downward tilt, in radians. Only bends screen y; depth and scale ignore it.
pub const CAMERA_PITCH: f64 = 0.38;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Point3 {
	pub fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	/// Point on a horizontal circle of radius `r` at height `y`.
	pub fn on_ring(radius: f64, angle: f64, y: f64) -> Self {
		Self::new(radius * angle.cos(), y, radius * angle.sin())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	pub scale: f64,
	/// Rotated Z, positive toward the viewer. Only used for paint order.
	pub depth: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Projector {
	pub center_x: f64,
	pub center_y: f64,
	pub pitch: f64,
}

impl Projector {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			center_x: width / 2.0,
			center_y: height / 2.0,
			pitch: CAMERA_PITCH,
		}
	}

	#[cfg(test)]
	pub fn with_pitch(mut self, pitch: f64) -> Self {
		self.pitch = pitch;
		self
	}

	pub fn project(&self, p: Point3, rotation: f64) -> Projected {
		let (sin_a, cos_a) = rotation.sin_cos();
		let x = p.x * cos_a - p.z * sin_a;
		let z = p.x * sin_a + p.z * cos_a;

		let (sin_p, cos_p) = self.pitch.sin_cos();
		let y = p.y * cos_p + z * sin_p;

		let camera_depth = (FOCAL_LENGTH - z).max(MIN_CAMERA_DEPTH);
		let scale = FOCAL_LENGTH / camera_depth;
		Projected {
			x: self.center_x + x * scale,
			y: self.center_y + y * scale,
			scale,
			depth: z,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::f64::consts::{FRAC_PI_2, PI};

	use super::*;

	const EPS: f64 = 1e-9;

	#[test]
	fn unit_scale_on_the_projection_plane() {
		let flat = Projector::new(800.0, 600.0).with_pitch(0.0);
		for angle in [0.0, 1.0, PI, -2.5] {
			let p = flat.project(Point3::new(0.0, 120.0, 0.0), angle);
			assert!((p.scale - 1.0).abs() < EPS);
			assert!((p.x - 400.0).abs() < EPS);
			assert!((p.y - 420.0).abs() < EPS);
		}
		let tilted = Projector::new(800.0, 600.0);
		assert!((tilted.project(Point3::default(), 0.7).scale - 1.0).abs() < EPS);
	}

	#[test]
	fn nearer_points_are_larger_and_paint_later() {
		let flat = Projector::new(0.0, 0.0).with_pitch(0.0);
		let near = flat.project(Point3::new(0.0, 0.0, 200.0), 0.0);
		let far = flat.project(Point3::new(0.0, 0.0, -200.0), 0.0);
		assert!(near.scale > 1.0 && far.scale < 1.0);
		assert!(near.depth > far.depth);
	}

	#[test]
	fn tilt_leaves_depth_and_scale_alone() {
		let tilted = Projector::new(0.0, 0.0);
		let top = tilted.project(Point3::new(0.0, -195.0, -110.0), 0.0);
		let bottom = tilted.project(Point3::new(0.0, 195.0, -100.0), 0.0);
		assert!((top.depth + 110.0).abs() < EPS);
		assert!((bottom.depth + 100.0).abs() < EPS);
		assert!((top.scale - FOCAL_LENGTH / 1010.0).abs() < EPS);
		assert!((bottom.scale - FOCAL_LENGTH / 1000.0).abs() < EPS);
		assert!(bottom.depth > top.depth);

		let flat = Projector::new(0.0, 0.0).with_pitch(0.0);
		let level = flat.project(Point3::new(0.0, 195.0, -100.0), 0.0);
		assert_eq!(level.scale, bottom.scale);
		assert!(bottom.y != level.y);
	}

	#[test]
	fn depth_floor_keeps_output_finite() {
		let flat = Projector::new(0.0, 0.0).with_pitch(0.0);
		let p = flat.project(Point3::new(5.0, 5.0, FOCAL_LENGTH * 3.0), 0.0);
		assert!((p.scale - FOCAL_LENGTH / MIN_CAMERA_DEPTH).abs() < EPS);
		assert!(p.x.is_finite() && p.y.is_finite());
	}

	#[test]
	fn facing_rotation_brings_node_to_front() {
		let flat = Projector::new(0.0, 0.0).with_pitch(0.0);
		let theta = 1.1;
		let p = flat.project(Point3::on_ring(300.0, theta, 0.0), FRAC_PI_2 - theta);
		assert!(p.x.abs() < 1e-6);
		assert!((p.depth - 300.0).abs() < 1e-6);
	}
}
