//! Client for the remote curriculum generator.

use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::components::lattice::{DocumentError, GraphDocument};

pub const DEFAULT_GENERATOR_ENDPOINT: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum GenerateError {
	#[error("no domain given")]
	EmptyDomain,
	#[error("request failed: {0}")]
	Transport(String),
	#[error("generator answered with status {0}")]
	Status(u16),
	#[error(transparent)]
	Document(#[from] DocumentError),
}

impl From<JsValue> for GenerateError {
	fn from(value: JsValue) -> Self {
		GenerateError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
	domain: &'a str,
}

/// Ask the generator for a curriculum graph covering `domain`.
pub async fn generate(endpoint: &str, domain: &str) -> Result<GraphDocument, GenerateError> {
	let domain = domain.trim();
	if domain.is_empty() {
		return Err(GenerateError::EmptyDomain);
	}
	let body = serde_json::to_string(&GenerateRequest { domain })
		.map_err(|err| GenerateError::Document(err.into()))?;

	let headers = Headers::new()?;
	headers.set("Content-Type", "application/json")?;
	let init = RequestInit::new();
	init.set_method("POST");
	init.set_headers(&headers);
	init.set_body(&JsValue::from_str(&body));
	let request = Request::new_with_str_and_init(endpoint, &init)?;

	let window = web_sys::window().ok_or_else(|| GenerateError::Transport("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	if !response.ok() {
		return Err(GenerateError::Status(response.status()));
	}
	let text = JsFuture::from(response.text()?)
		.await?
		.as_string()
		.unwrap_or_default();
	Ok(GraphDocument::from_json(&text)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_body_shape() {
		let body = serde_json::to_string(&GenerateRequest { domain: "Nursing" }).unwrap();
		assert_eq!(body, r#"{"domain":"Nursing"}"#);
	}

	#[test]
	fn decode_failures_surface_as_document_errors() {
		let err: GenerateError = GraphDocument::from_json("not json").unwrap_err().into();
		assert!(matches!(err, GenerateError::Document(_)));
		assert!(err.to_string().starts_with("malformed graph document"));
	}
}
