//! Yaw of the lattice view.
//!
//! Exactly one of three drivers moves the rotation on any frame: a pointer
//! drag, an ease toward a target, or the idle spin. A camera that has been
//! told to face a node holds still once the ease lands, until released.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Idle spin, radians per frame.
pub const IDLE_SPEED: f64 = 0.0015;
/// Share of the remaining angle covered each eased frame.
pub const EASE_FACTOR: f64 = 0.08;
/// Remaining angle below which the ease snaps to its target.
pub const SNAP_THRESHOLD: f64 = 0.001;
/// Radians per horizontal pixel of drag.
pub const DRAG_SENSITIVITY: f64 = 0.005;

/// Wrap into (−π, π].
pub fn normalize_angle(angle: f64) -> f64 {
	let wrapped = (angle + PI).rem_euclid(TAU) - PI;
	if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[derive(Clone, Debug, Default)]
struct Grip {
	start_x: f64,
	start_rotation: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Camera {
	rotation: f64,
	target: Option<f64>,
	holding: bool,
	grip: Option<Grip>,
}

impl Camera {
	pub fn rotation(&self) -> f64 {
		self.rotation
	}

	#[cfg(test)]
	pub fn target(&self) -> Option<f64> {
		self.target
	}

	pub fn is_dragging(&self) -> bool {
		self.grip.is_some()
	}

	/// Advance one frame.
	pub fn tick(&mut self) {
		if self.grip.is_some() {
			return;
		}
		match self.target {
			Some(target) => {
				let remaining = normalize_angle(target - self.rotation);
				if remaining.abs() < SNAP_THRESHOLD {
					self.rotation = target;
					self.target = None;
				} else {
					self.rotation += remaining * EASE_FACTOR;
				}
			}
			None if self.holding => {}
			None => self.rotation += IDLE_SPEED,
		}
	}

	/// Ease so the node at `angle` on its ring turns toward the viewer, taking
	/// the short way round from wherever the camera is now.
	pub fn face(&mut self, angle: f64) {
		let facing = FRAC_PI_2 - angle;
		self.target = Some(self.rotation + normalize_angle(facing - self.rotation));
		self.holding = true;
	}

	/// Drop any target and go back to idling.
	pub fn release_target(&mut self) {
		self.target = None;
		self.holding = false;
	}

	pub fn begin_drag(&mut self, pointer_x: f64) {
		self.release_target();
		self.grip = Some(Grip {
			start_x: pointer_x,
			start_rotation: self.rotation,
		});
	}

	pub fn drag_to(&mut self, pointer_x: f64) {
		if let Some(grip) = &self.grip {
			self.rotation = grip.start_rotation + (pointer_x - grip.start_x) * DRAG_SENSITIVITY;
		}
	}

	pub fn end_drag(&mut self) {
		self.grip = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_into_half_open_interval() {
		assert!((normalize_angle(PI) - PI).abs() < 1e-12);
		assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
		assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
		assert!((normalize_angle(7.0 * TAU + 0.25) - 0.25).abs() < 1e-9);
	}

	#[test]
	fn idles_forward() {
		let mut camera = Camera::default();
		camera.tick();
		camera.tick();
		assert!((camera.rotation() - 2.0 * IDLE_SPEED).abs() < 1e-12);
	}

	#[test]
	fn ease_converges_and_clears_target() {
		let mut camera = Camera::default();
		camera.face(-FRAC_PI_2);
		assert!((camera.target().unwrap() - PI).abs() < 1e-12);
		for _ in 0..500 {
			camera.tick();
		}
		assert!((camera.rotation() - PI).abs() < 1e-9);
		assert_eq!(camera.target(), None);
	}

	#[test]
	fn landed_camera_holds_until_released() {
		let mut camera = Camera::default();
		camera.face(0.4);
		for _ in 0..750 {
			camera.tick();
		}
		let landed = FRAC_PI_2 - 0.4;
		assert!((camera.rotation() - landed).abs() < 1e-9);

		camera.release_target();
		camera.tick();
		assert!((camera.rotation() - landed - IDLE_SPEED).abs() < 1e-12);
	}

	#[test]
	fn face_takes_the_short_way() {
		let mut camera = Camera {
			rotation: 10.0 * TAU,
			..Camera::default()
		};
		camera.face(FRAC_PI_2);
		let target = camera.target().unwrap();
		assert!((target - 10.0 * TAU).abs() < 1e-9);
	}

	#[test]
	fn retarget_mid_ease_starts_from_current_rotation() {
		let mut camera = Camera::default();
		camera.face(FRAC_PI_2 - 1.0);
		for _ in 0..10 {
			camera.tick();
		}
		let mid = camera.rotation();
		assert!(mid > 0.0 && mid < 1.0);
		camera.face(FRAC_PI_2);
		camera.tick();
		assert!(camera.rotation() < mid);
		assert!(camera.rotation() > 0.0);
	}

	#[test]
	fn drag_overrides_and_clears_target() {
		let mut camera = Camera::default();
		camera.face(0.3);
		camera.begin_drag(100.0);
		assert_eq!(camera.target(), None);
		camera.drag_to(300.0);
		assert!((camera.rotation() - 200.0 * DRAG_SENSITIVITY).abs() < 1e-12);

		let held = camera.rotation();
		camera.tick();
		assert_eq!(camera.rotation(), held);

		camera.end_drag();
		camera.tick();
		assert!((camera.rotation() - held - IDLE_SPEED).abs() < 1e-12);
	}
}
