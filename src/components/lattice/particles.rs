//! Flow markers along highlighted links. Positions are a pure function of wall
//! clock time; nothing is integrated between frames.

use super::scene::SceneFrame;

/// Seconds for a marker to travel the full length of a link.
pub const FLOW_PERIOD: f64 = 1.8;
/// Trail length as a fraction of the link.
pub const TRAIL_LENGTH: f64 = 0.22;

#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
	/// Faded end.
	pub tail: (f64, f64),
	/// Bright end, nearer the deep endpoint.
	pub head: (f64, f64),
	pub color: &'static str,
	pub width: f64,
}

/// Stable per-link offset in [0, 1) so markers do not march in step.
pub fn phase(id: &str) -> f64 {
	let hash = id
		.bytes()
		.fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
	(hash % 1000) as f64 / 1000.0
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
	(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

pub fn trails(frame: &SceneFrame, seconds: f64) -> Vec<Trail> {
	frame
		.links
		.iter()
		.filter(|link| link.highlighted)
		.map(|link| {
			let t = (seconds / FLOW_PERIOD + phase(&link.deep_id)).fract();
			Trail {
				tail: lerp(link.from, link.to, (t - TRAIL_LENGTH).max(0.0)),
				head: lerp(link.from, link.to, t),
				color: link.color,
				width: link.width * 1.4,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lattice::scene::LinkSprite;

	fn link(highlighted: bool, deep_id: &str) -> LinkSprite {
		LinkSprite {
			key: 0,
			from: (0.0, 0.0),
			to: (100.0, 0.0),
			deep_id: deep_id.into(),
			color: "#fff",
			width: 2.0,
			opacity: 1.0,
			highlighted,
		}
	}

	#[test]
	fn nothing_flows_without_highlight() {
		let frame = SceneFrame {
			links: vec![link(false, "k")],
			..SceneFrame::default()
		};
		assert!(trails(&frame, 3.0).is_empty());
	}

	#[test]
	fn markers_run_shallow_to_deep() {
		let frame = SceneFrame {
			links: vec![link(true, "k")],
			..SceneFrame::default()
		};
		let start = FLOW_PERIOD * (1.0 - phase("k")) + 10.0 * FLOW_PERIOD;
		let early = &trails(&frame, start + 0.5)[0];
		let later = &trails(&frame, start + 1.0)[0];
		assert!(later.head.0 > early.head.0);
		assert!(early.tail.0 <= early.head.0);
		assert!(early.head.0 >= 0.0 && later.head.0 <= 100.0);
	}

	#[test]
	fn phase_is_stable_and_spread() {
		assert_eq!(phase("K12"), phase("K12"));
		assert!((0.0..1.0).contains(&phase("K12")));
		assert_ne!(phase("K12"), phase("K13"));
	}
}
