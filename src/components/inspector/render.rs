use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{FOCUS_RADIUS, InspectorState, NODE_RADIUS, NodeInfo};
use crate::components::lattice::scene::truncate_label;

const BACKGROUND: &str = "#11131c";
const LABEL_CHARS: usize = 12;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Hex `#rrggbb` to an `rgba()` string.
fn rgba(hex: &str, alpha: f64) -> String {
	let channel = |i: usize| {
		hex.get(i..i + 2)
			.and_then(|c| u8::from_str_radix(c, 16).ok())
			.unwrap_or(255)
	};
	format!("rgba({}, {}, {}, {alpha})", channel(1), channel(3), channel(5))
}

fn radius_of(info: &NodeInfo) -> f64 {
	if info.focus { FOCUS_RADIUS } else { NODE_RADIUS }
}

pub fn render(state: &InspectorState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	if state.is_empty() {
		return;
	}
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &InspectorState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.4 / k, 7.0 / k, 4.0 / k, 7.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.level);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return;
		}
		let (r1, r2) = (radius_of(&n1.data.user_data), radius_of(&n2.data.user_data));

		let lit = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());
		let (edge_alpha, width) = if lit {
			(0.55 + 0.4 * t, line_width * (1.0 + 0.4 * t))
		} else {
			(0.55 - 0.4 * t, line_width * (1.0 - 0.3 * t))
		};
		let color = n1.data.user_data.color;

		ctx.set_stroke_style_str(&rgba(color, edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&rgba(color, (edge_alpha + 0.2).min(1.0)));
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	});
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	(x, y): (f64, f64),
	radius: f64,
	alpha: f64,
	k: f64,
	full: bool,
) {
	let text = if full || info.focus {
		info.label.clone()
	} else {
		truncate_label(&info.label, LABEL_CHARS)
	};
	ctx.set_fill_style_str(&format!("rgba(235, 238, 245, {alpha})"));
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(&text, x + radius + 3.0, y + 3.0);
}

fn draw_nodes(state: &InspectorState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.level),
		state.transform.k,
	);

	// Dimmed pass first so highlighted nodes sit on top.
	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, radius_of(info) * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(info.color);
		ctx.fill();
		if info.focus {
			ctx.set_stroke_style_str("#ffffff");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}
		ctx.set_global_alpha(1.0);
		draw_label(ctx, info, (x, y), radius, alpha * 0.85, k, false);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let base = radius_of(info);
		let hovered = state.is_hovered(idx);

		let (radius, glow_radius) = if hovered {
			(base * (1.0 + 0.35 * t), base * (1.8 + 1.2 * t))
		} else {
			(base * (1.0 + 0.2 * t), base * (1.4 + 0.6 * t))
		};

		let glow = if t > 0.01 {
			ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius).ok()
		} else {
			None
		};
		if let Some(gradient) = glow {
			let alpha = if hovered { 0.35 * t } else { 0.2 * t };
			let stops = [
				(0.0, rgba(info.color, alpha)),
				(0.6, rgba(info.color, alpha * 0.3)),
				(1.0, rgba(info.color, 0.0)),
			];
			if stops.iter().all(|(at, c)| gradient.add_color_stop(*at, c).is_ok()) {
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(info.color);
		ctx.fill();

		if (hovered || info.focus) && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		draw_label(ctx, info, (x, y), radius, 1.0, k, hovered);
	});
}
