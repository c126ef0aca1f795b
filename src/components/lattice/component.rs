use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, WheelEvent, Window,
};

use super::render::{self, SvgScene};
use super::state::LatticeState;
use super::types::{GraphDocument, NodeId};

fn viewport_size(
	window: &Window,
	stage: &Element,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return window_size(window);
	}
	(
		width.unwrap_or_else(|| match stage.client_width() {
			0 => 800.0,
			w => w as f64,
		}),
		height.unwrap_or_else(|| match stage.client_height() {
			0 => 600.0,
			h => h as f64,
		}),
	)
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

/// Size the overlay in device pixels while keeping its CSS box at `w`×`h`.
fn fit_canvas(canvas: &HtmlCanvasElement, w: f64, h: f64, ratio: f64) {
	canvas.set_width((w * ratio) as u32);
	canvas.set_height((h * ratio) as u32);
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{w}px"));
	let _ = style.set_property("height", &format!("{h}px"));
}

fn pointer_in(stage: Option<impl AsRef<Element>>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = stage?.as_ref().get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// The layered curriculum graph: an SVG scene with a particle canvas on top,
/// driven by one animation-frame loop.
#[component]
pub fn LatticeView(
	#[prop(into)] data: Signal<GraphDocument>,
	selected: RwSignal<Option<NodeId>>,
	#[prop(into)] show_all: Signal<bool>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let stage_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<LatticeState>>> = Rc::new(RefCell::new(None));
	let scene: Rc<RefCell<Option<SvgScene>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, scene_init, animate_init, resize_cb_init) =
		(state.clone(), scene.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let (Some(stage), Some(canvas)) = (stage_ref.get(), canvas_ref.get()) else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let stage: Element = stage.into();
		let canvas: HtmlCanvasElement = canvas.into();

		let (w, h) = viewport_size(&window, &stage, fullscreen, width, height);
		let ratio = window.device_pixel_ratio().max(1.0);
		fit_canvas(&canvas, w, h, ratio);
		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("particle overlay has no 2d context");
				return;
			}
		};

		let state_pick = state_init.clone();
		let pick: Rc<dyn Fn(&str)> = Rc::new(move |id: &str| {
			let is_click = state_pick
				.try_borrow()
				.ok()
				.and_then(|s| s.as_ref().map(LatticeState::is_click))
				.unwrap_or(true);
			if is_click {
				selected.set(Some(id.to_owned()));
			}
		});
		let svg_scene = match SvgScene::mount(&stage, pick) {
			Ok(svg_scene) => svg_scene,
			Err(err) => {
				warn!("could not build lattice scene: {err:?}");
				return;
			}
		};
		let _ = svg_scene.resize(w, h);

		let mut lattice = LatticeState::new(data.get_untracked(), w, h);
		lattice.set_show_all(show_all.get_untracked());
		lattice.select(selected.get_untracked().as_deref());
		*state_init.borrow_mut() = Some(lattice);
		*scene_init.borrow_mut() = Some(svg_scene);
		info!("lattice view mounted at {w}x{h}");

		if fullscreen {
			let (state_resize, scene_resize, canvas_resize) =
				(state_init.clone(), scene_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				fit_canvas(&canvas_resize, nw, nh, ratio);
				if let Some(ref scene) = *scene_resize.borrow() {
					let _ = scene.resize(nw, nh);
				}
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, scene_anim, animate_inner) =
			(state_init.clone(), scene_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut state = state_anim.borrow_mut();
				let mut scene = scene_anim.borrow_mut();
				if let (Some(s), Some(scene)) = (state.as_mut(), scene.as_mut()) {
					s.tick(js_sys::Date::now() / 1000.0);
					let frame = s.frame();
					if let Err(err) = scene.draw(&frame, &s.transform) {
						warn!("lattice redraw failed: {err:?}");
					}
					render::draw_trails(
						&ctx,
						&s.trails(&frame),
						&s.transform,
						s.width,
						s.height,
						ratio,
					);
				}
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_doc = state.clone();
	Effect::new(move |_| {
		let doc = data.get();
		if let Some(ref mut s) = *state_doc.borrow_mut() {
			info!("lattice document swapped: {} nodes, {} links", doc.nodes.len(), doc.links.len());
			s.set_document(doc);
		}
	});

	let state_sel = state.clone();
	Effect::new(move |_| {
		let id = selected.get();
		if let Some(ref mut s) = *state_sel.borrow_mut() {
			s.select(id.as_deref());
		}
	});

	let state_all = state.clone();
	Effect::new(move |_| {
		let all = show_all.get();
		if let Some(ref mut s) = *state_all.borrow_mut() {
			s.set_show_all(all);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = pointer_in(stage_ref.get(), &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y, ev.shift_key());
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_in(stage_ref.get(), &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.drag(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.release();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
		}
	};

	// Node glyphs stop propagation, so this only sees clicks on empty space.
	let state_ck = state.clone();
	let on_click = move |_: MouseEvent| {
		let is_click = state_ck
			.borrow()
			.as_ref()
			.map(LatticeState::is_click)
			.unwrap_or(false);
		if is_click {
			selected.set(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_in(stage_ref.get(), &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.transform.zoom_at(x, y, factor);
		}
	};

	let stage_style = if fullscreen {
		"position: fixed; inset: 0; overflow: hidden; cursor: grab;".to_string()
	} else {
		format!(
			"position: relative; overflow: hidden; cursor: grab; width: {}; height: {};",
			width.map_or("100%".to_string(), |w| format!("{w}px")),
			height.map_or("100%".to_string(), |h| format!("{h}px")),
		)
	};

	view! {
		<div
			node_ref=stage_ref
			class="lattice-stage"
			style=stage_style
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:wheel=on_wheel
		>
			<canvas
				node_ref=canvas_ref
				class="lattice-particles"
				style="position: absolute; left: 0; top: 0; pointer-events: none;"
			/>
		</div>
	}
}
