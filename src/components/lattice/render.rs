use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, MouseEvent};

use super::particles::Trail;
use super::scene::{LinkSprite, NodeSprite, RingSprite, SceneFrame};
use super::state::ViewTransform;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const GLOW_FILTER: &str = "lattice-glow";

fn svg(document: &Document, tag: &str) -> Result<Element, JsValue> {
	document.create_element_ns(Some(SVG_NS), tag)
}

fn set(el: &Element, attrs: &[(&str, &str)]) -> Result<(), JsValue> {
	for (name, value) in attrs {
		el.set_attribute(name, value)?;
	}
	Ok(())
}

fn outline_path(points: &[(f64, f64)], out: &mut String) {
	for (i, (x, y)) in points.iter().enumerate() {
		let cmd = if i == 0 { 'M' } else { 'L' };
		let _ = write!(out, "{cmd}{x:.1},{y:.1}");
	}
	out.push('Z');
}

struct Glyph {
	group: Element,
	halo: Element,
	disc: Element,
	label: Element,
	title: Element,
	tooltip: String,
	caption: String,
	_on_click: Closure<dyn FnMut(MouseEvent)>,
}

/// Retained SVG scene. Nodes and links keep their elements across frames and
/// only have attributes rewritten.
pub struct SvgScene {
	document: Document,
	root: Element,
	viewport: Element,
	ring_layer: Element,
	link_layer: Element,
	node_layer: Element,
	rings: Vec<Element>,
	links: HashMap<usize, Element>,
	glyphs: HashMap<String, Glyph>,
	paint_order: Vec<String>,
	on_pick: Rc<dyn Fn(&str)>,
}

impl SvgScene {
	/// Build the `<svg>` root as the first child of `stage`.
	pub fn mount(stage: &Element, on_pick: Rc<dyn Fn(&str)>) -> Result<Self, JsValue> {
		let document = stage
			.owner_document()
			.ok_or_else(|| JsValue::from_str("stage is detached"))?;
		let root = svg(&document, "svg")?;
		set(
			&root,
			&[
				("class", "lattice-scene"),
				("style", "position: absolute; inset: 0; display: block;"),
			],
		)?;

		let defs = svg(&document, "defs")?;
		let filter = svg(&document, "filter")?;
		set(
			&filter,
			&[
				("id", GLOW_FILTER),
				("x", "-50%"),
				("y", "-50%"),
				("width", "200%"),
				("height", "200%"),
			],
		)?;
		let blur = svg(&document, "feGaussianBlur")?;
		set(&blur, &[("stdDeviation", "2.5"), ("result", "blur")])?;
		let merge = svg(&document, "feMerge")?;
		for input in ["blur", "SourceGraphic"] {
			let node = svg(&document, "feMergeNode")?;
			node.set_attribute("in", input)?;
			merge.append_child(&node)?;
		}
		filter.append_child(&blur)?;
		filter.append_child(&merge)?;
		defs.append_child(&filter)?;
		root.append_child(&defs)?;

		let viewport = svg(&document, "g")?;
		let ring_layer = svg(&document, "g")?;
		let link_layer = svg(&document, "g")?;
		let node_layer = svg(&document, "g")?;
		for layer in [&ring_layer, &link_layer, &node_layer] {
			viewport.append_child(layer)?;
		}
		root.append_child(&viewport)?;
		stage.insert_before(&root, stage.first_child().as_ref())?;

		Ok(Self {
			document,
			root,
			viewport,
			ring_layer,
			link_layer,
			node_layer,
			rings: Vec::new(),
			links: HashMap::new(),
			glyphs: HashMap::new(),
			paint_order: Vec::new(),
			on_pick,
		})
	}

	pub fn resize(&self, width: f64, height: f64) -> Result<(), JsValue> {
		set(
			&self.root,
			&[
				("width", width.to_string().as_str()),
				("height", height.to_string().as_str()),
			],
		)
	}

	pub fn draw(&mut self, frame: &SceneFrame, transform: &ViewTransform) -> Result<(), JsValue> {
		self.viewport.set_attribute(
			"transform",
			&format!(
				"translate({},{}) scale({})",
				transform.x, transform.y, transform.k
			),
		)?;
		self.draw_rings(&frame.rings)?;
		self.draw_links(&frame.links)?;
		self.draw_nodes(&frame.nodes)
	}

	fn draw_rings(&mut self, rings: &[RingSprite]) -> Result<(), JsValue> {
		while self.rings.len() < rings.len() {
			let path = svg(&self.document, "path")?;
			self.ring_layer.append_child(&path)?;
			self.rings.push(path);
		}
		let mut d = String::new();
		for (el, ring) in self.rings.iter().zip(rings) {
			d.clear();
			outline_path(&ring.outer, &mut d);
			if let Some(inner) = &ring.inner {
				outline_path(inner, &mut d);
			}
			set(
				el,
				&[
					("d", d.as_str()),
					("fill", ring.color),
					("fill-opacity", "0.05"),
					("fill-rule", "evenodd"),
					("stroke", ring.color),
					("stroke-opacity", "0.25"),
					("stroke-width", "1"),
				],
			)?;
		}
		Ok(())
	}

	fn draw_links(&mut self, links: &[LinkSprite]) -> Result<(), JsValue> {
		let keep: HashSet<usize> = links.iter().map(|l| l.key).collect();
		self.links.retain(|key, el| {
			let live = keep.contains(key);
			if !live {
				el.remove();
			}
			live
		});

		for link in links {
			let el = match self.links.get(&link.key) {
				Some(el) => el.clone(),
				None => {
					let el = svg(&self.document, "line")?;
					el.set_attribute("stroke-linecap", "round")?;
					self.link_layer.append_child(&el)?;
					self.links.insert(link.key, el.clone());
					el
				}
			};
			set(
				&el,
				&[
					("x1", link.from.0.to_string().as_str()),
					("y1", link.from.1.to_string().as_str()),
					("x2", link.to.0.to_string().as_str()),
					("y2", link.to.1.to_string().as_str()),
					("stroke", link.color),
					("stroke-width", link.width.to_string().as_str()),
					("stroke-opacity", link.opacity.to_string().as_str()),
				],
			)?;
			if link.highlighted {
				el.set_attribute("filter", &format!("url(#{GLOW_FILTER})"))?;
			} else {
				el.remove_attribute("filter")?;
			}
		}
		Ok(())
	}

	fn glyph(&mut self, id: &str) -> Result<&mut Glyph, JsValue> {
		if !self.glyphs.contains_key(id) {
			let group = svg(&self.document, "g")?;
			set(&group, &[("class", "lattice-node"), ("style", "cursor: pointer;")])?;
			let title = svg(&self.document, "title")?;
			let halo = svg(&self.document, "circle")?;
			set(&halo, &[("fill", "none"), ("stroke", "#ffffff"), ("stroke-width", "1.5")])?;
			let disc = svg(&self.document, "circle")?;
			let label = svg(&self.document, "text")?;
			set(
				&label,
				&[
					("text-anchor", "middle"),
					("fill", "#e8eaf0"),
					("font-family", "sans-serif"),
					("pointer-events", "none"),
				],
			)?;
			for child in [&title, &halo, &disc, &label] {
				group.append_child(child)?;
			}

			let (pick, owned) = (self.on_pick.clone(), id.to_owned());
			let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
				ev.stop_propagation();
				pick(&owned);
			});
			group.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

			self.glyphs.insert(
				id.to_owned(),
				Glyph {
					group,
					halo,
					disc,
					label,
					title,
					tooltip: String::new(),
					caption: String::new(),
					_on_click: on_click,
				},
			);
		}
		self.glyphs
			.get_mut(id)
			.ok_or_else(|| JsValue::from_str("glyph vanished"))
	}

	fn draw_nodes(&mut self, nodes: &[NodeSprite]) -> Result<(), JsValue> {
		let keep: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		self.glyphs.retain(|id, glyph| {
			let live = keep.contains(id.as_str());
			if !live {
				glyph.group.remove();
			}
			live
		});

		for node in nodes {
			let glyph = self.glyph(&node.id)?;
			let (cx, cy) = (node.x.to_string(), node.y.to_string());
			glyph.group.set_attribute("opacity", node.opacity.to_string().as_str())?;
			if glyph.tooltip != node.tooltip {
				glyph.title.set_text_content(Some(&node.tooltip));
				glyph.tooltip.clone_from(&node.tooltip);
			}
			set(
				&glyph.disc,
				&[
					("cx", cx.as_str()),
					("cy", cy.as_str()),
					("r", node.radius.to_string().as_str()),
					("fill", node.color),
				],
			)?;
			if node.selected {
				set(
					&glyph.halo,
					&[
						("cx", cx.as_str()),
						("cy", cy.as_str()),
						("r", (node.radius + 4.0).to_string().as_str()),
						("visibility", "visible"),
					],
				)?;
			} else {
				glyph.halo.set_attribute("visibility", "hidden")?;
			}
			match &node.label {
				Some(text) => {
					let font = (node.radius * 0.9).clamp(8.0, 15.0);
					set(
						&glyph.label,
						&[
							("x", cx.as_str()),
							("y", (node.y + node.radius + font + 1.0).to_string().as_str()),
							("font-size", font.to_string().as_str()),
							("font-weight", if node.selected { "600" } else { "400" }),
							("visibility", "visible"),
						],
					)?;
					if &glyph.caption != text {
						glyph.label.set_text_content(Some(text));
						glyph.caption.clone_from(text);
					}
				}
				None => glyph.label.set_attribute("visibility", "hidden")?,
			}
		}

		if self.paint_order.iter().map(String::as_str).ne(nodes.iter().map(|n| n.id.as_str())) {
			for node in nodes {
				if let Some(glyph) = self.glyphs.get(&node.id) {
					self.node_layer.append_child(&glyph.group)?;
				}
			}
			self.paint_order = nodes.iter().map(|n| n.id.clone()).collect();
		}
		Ok(())
	}
}

/// Redraw the particle overlay. The canvas is cleared every frame; trails are
/// drawn under the same pan/zoom as the SVG scene.
pub fn draw_trails(
	ctx: &CanvasRenderingContext2d,
	trails: &[Trail],
	transform: &ViewTransform,
	width: f64,
	height: f64,
	pixel_ratio: f64,
) {
	let _ = ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
	ctx.clear_rect(0.0, 0.0, width, height);
	if trails.is_empty() {
		return;
	}
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	ctx.set_line_cap("round");

	for trail in trails {
		let gradient =
			ctx.create_linear_gradient(trail.tail.0, trail.tail.1, trail.head.0, trail.head.1);
		if gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0)").is_err()
			|| gradient.add_color_stop(0.7, trail.color).is_err()
			|| gradient.add_color_stop(1.0, "#ffffff").is_err()
		{
			continue;
		}
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width(trail.width);
		ctx.begin_path();
		ctx.move_to(trail.tail.0, trail.tail.1);
		ctx.line_to(trail.head.0, trail.head.1);
		ctx.stroke();
	}
	ctx.restore();
}
