use std::collections::HashSet;

use log::debug;

use super::camera::Camera;
use super::layout::{self, Placement, VisibilityFilter};
use super::lineage;
use super::particles::{self, Trail};
use super::projection::Projector;
use super::scene::{self, Focus, SceneFrame};
use super::types::{GraphDocument, NodeId};

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 5.0;
/// Pointer travel, in pixels, after which a press counts as a drag.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Zoom by `factor` keeping the screen point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[derive(Clone, Debug, Default)]
pub struct PointerState {
	pub active: bool,
	pub panning: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything the lattice view mutates between frames. Owned by the animation
/// loop; input handlers write to it directly.
pub struct LatticeState {
	document: GraphDocument,
	selected: Option<NodeId>,
	lineage: HashSet<NodeId>,
	show_all: bool,
	placements: Vec<Placement>,
	pub camera: Camera,
	pub transform: ViewTransform,
	pub pointer: PointerState,
	pub projector: Projector,
	pub width: f64,
	pub height: f64,
	pub clock: f64,
}

impl LatticeState {
	pub fn new(document: GraphDocument, width: f64, height: f64) -> Self {
		let mut state = Self {
			document,
			selected: None,
			lineage: HashSet::new(),
			show_all: false,
			placements: Vec::new(),
			camera: Camera::default(),
			transform: ViewTransform::default(),
			pointer: PointerState::default(),
			projector: Projector::new(width, height),
			width,
			height,
			clock: 0.0,
		};
		state.relayout();
		state
	}

	#[cfg(test)]
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	#[cfg(test)]
	pub fn lineage(&self) -> &HashSet<NodeId> {
		&self.lineage
	}

	#[cfg(test)]
	pub fn placements(&self) -> &[Placement] {
		&self.placements
	}

	/// Swap in a new document. All derived state is rebuilt and the selection dropped.
	pub fn set_document(&mut self, document: GraphDocument) {
		if document == self.document {
			return;
		}
		self.document = document;
		self.selected = None;
		self.lineage.clear();
		self.camera.release_target();
		self.relayout();
	}

	pub fn set_show_all(&mut self, show_all: bool) {
		if self.show_all != show_all {
			self.show_all = show_all;
			self.relayout();
		}
	}

	/// Change the selection. Unknown ids clear it.
	pub fn select(&mut self, id: Option<&str>) {
		let id = id.filter(|id| self.document.node(id).is_some());
		if self.selected.as_deref() == id {
			return;
		}
		self.selected = id.map(str::to_owned);
		self.lineage = match id {
			Some(id) => lineage::resolve(&self.document, id),
			None => HashSet::new(),
		};
		debug!("selection {:?}, lineage of {}", self.selected, self.lineage.len());
		self.relayout();

		let facing = self
			.selected
			.as_deref()
			.and_then(|id| self.placements.iter().find(|p| p.id == id))
			.map(|p| p.angle);
		match facing {
			Some(angle) => self.camera.face(angle),
			None => self.camera.release_target(),
		}
	}

	fn relayout(&mut self) {
		let filter = VisibilityFilter {
			selected: self.selected.as_deref(),
			lineage: &self.lineage,
			show_all: self.show_all,
		};
		let visible = filter.apply(&self.document);
		self.placements = layout::layout(&visible);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.projector = Projector {
			pitch: self.projector.pitch,
			..Projector::new(width, height)
		};
	}

	/// Advance the camera one frame and record the wall clock for particles.
	pub fn tick(&mut self, seconds: f64) {
		self.camera.tick();
		self.clock = seconds;
	}

	pub fn frame(&self) -> SceneFrame {
		let focus = Focus {
			selected: self.selected.as_deref(),
			lineage: &self.lineage,
		};
		scene::compose(
			&self.document,
			&self.placements,
			&focus,
			&self.projector,
			self.camera.rotation(),
		)
	}

	pub fn trails(&self, frame: &SceneFrame) -> Vec<Trail> {
		particles::trails(frame, self.clock)
	}

	/// Pointer down. Nothing moves until the pointer travels past [`CLICK_SLOP`],
	/// so a plain click never disturbs the camera.
	pub fn press(&mut self, x: f64, y: f64, panning: bool) {
		self.pointer = PointerState {
			active: true,
			panning,
			moved: false,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn drag(&mut self, x: f64, y: f64) {
		if !self.pointer.active {
			return;
		}
		let (dx, dy) = (x - self.pointer.start_x, y - self.pointer.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pointer.moved = true;
		}
		if !self.pointer.moved {
			return;
		}
		if self.pointer.panning {
			self.transform.x = self.pointer.transform_start_x + dx;
			self.transform.y = self.pointer.transform_start_y + dy;
		} else {
			if !self.camera.is_dragging() {
				self.camera.begin_drag(self.pointer.start_x);
			}
			self.camera.drag_to(x);
		}
	}

	pub fn release(&mut self) {
		self.pointer.active = false;
		self.camera.end_drag();
	}

	/// Whether the click that ends the current gesture should act as a click.
	pub fn is_click(&self) -> bool {
		!self.pointer.moved
	}
}
