use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::components::inspector::{InspectorData, RadialInspector};
use crate::components::lattice::{GraphDocument, Impact, LAYER_COUNT, LatticeView, NodeId, lineage};
use crate::generator::{self, DEFAULT_GENERATOR_ENDPOINT};

const LAYER_NAMES: [&str; LAYER_COUNT] =
	["objectives", "requirements", "courses", "knowledge points"];
const GENERATE_FAILED: &str = "Could not generate a curriculum graph. Please try again.";

#[derive(Clone, Debug, PartialEq)]
struct NodeDetails {
	label: String,
	kind: &'static str,
	description: Option<String>,
	lineage: usize,
	impact: Impact,
}

impl NodeDetails {
	fn of(doc: &GraphDocument, id: &str) -> Option<Self> {
		let node = doc.node(id)?;
		Some(Self {
			label: node.label.clone(),
			kind: node.kind.label(),
			description: node.description.clone(),
			lineage: lineage::resolve(doc, id).len(),
			impact: lineage::impact(doc, id),
		})
	}

	fn impact_summary(&self) -> String {
		let parts: Vec<String> = self
			.impact
			.per_layer
			.iter()
			.zip(LAYER_NAMES)
			.filter(|(count, _)| **count > 0)
			.map(|(count, name)| format!("{count} {name}"))
			.collect();
		match self.impact.total() {
			0 => "No dependants".to_string(),
			total => format!("{total} dependants: {}", parts.join(", ")),
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let document = RwSignal::new(GraphDocument::bundled());
	let selected = RwSignal::new(None::<NodeId>);
	let show_all = RwSignal::new(false);
	let domain = RwSignal::new(String::new());
	let busy = RwSignal::new(false);
	let notice = RwSignal::new(None::<String>);

	let inspector_data = Signal::derive(move || {
		selected
			.get()
			.map(|id| document.with(|d| InspectorData::from_lineage(d, &id)))
			.unwrap_or_default()
	});
	let details = Memo::new(move |_| {
		selected
			.get()
			.and_then(|id| document.with(|d| NodeDetails::of(d, &id)))
	});

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		if busy.get_untracked() {
			return;
		}
		let name = domain.get_untracked();
		busy.set(true);
		notice.set(None);
		spawn_local(async move {
			match generator::generate(DEFAULT_GENERATOR_ENDPOINT, &name).await {
				Ok(doc) => {
					info!("generated {} nodes for {name:?}", doc.nodes.len());
					selected.set(None);
					document.set(doc);
				}
				Err(err) => {
					warn!("generation for {name:?} failed: {err}");
					notice.set(Some(GENERATE_FAILED.into()));
				}
			}
			busy.set(false);
		});
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<LatticeView data=document selected=selected show_all=show_all fullscreen=true />

				<div class="graph-overlay">
					<h1>"Curriculum Lattice"</h1>
					<p class="subtitle">
						"Click a node to trace its lineage. Drag to rotate, shift-drag to pan, scroll to zoom."
					</p>
					<form class="generate-form" on:submit=on_submit>
						<input
							type="text"
							placeholder="Domain, e.g. Civil Engineering"
							prop:value=move || domain.get()
							on:input=move |ev| domain.set(event_target_value(&ev))
							prop:disabled=move || busy.get()
						/>
						<button type="submit" prop:disabled=move || busy.get()>
							{move || if busy.get() { "Generating…" } else { "Generate" }}
						</button>
					</form>
					<label class="show-all">
						<input
							type="checkbox"
							prop:checked=move || show_all.get()
							on:change=move |ev| show_all.set(event_target_checked(&ev))
						/>
						"Show every knowledge point"
					</label>
					{move || {
						notice.get().map(|msg| view! { <p class="notice" role="alert">{msg}</p> })
					}}
				</div>

				<aside
					class="inspector-panel"
					style:display=move || if selected.get().is_some() { "block" } else { "none" }
				>
					{move || {
						details
							.get()
							.map(|d| {
								let summary = d.impact_summary();
								view! {
									<h2>{d.label}</h2>
									<p class="kind">{d.kind}" · lineage of "{d.lineage}</p>
									{d
										.description
										.map(|text| view! { <p class="description">{text}</p> })}
									<p class="impact">{summary}</p>
								}
							})
					}}
					<RadialInspector
						data=inspector_data
						on_select=Callback::new(move |id: String| selected.set(Some(id)))
					/>
				</aside>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lattice::{GraphLink, node};

	#[test]
	fn details_summarise_dependants() {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("B", 1), node("K1", 3), node("K2", 3)],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("K1", "B"),
				GraphLink::new("K2", "B"),
			],
		);
		let details = NodeDetails::of(&doc, "B").unwrap();
		assert_eq!(details.lineage, 4);
		assert_eq!(details.impact_summary(), "2 dependants: 2 knowledge points");
		assert_eq!(NodeDetails::of(&doc, "K1").unwrap().impact_summary(), "No dependants");
		assert!(NodeDetails::of(&doc, "Z").is_none());
	}
}
