use axum::{
    extract::Path,
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use serde_json::{json, Value};
use tracing::debug;

use crate::dto::PlaceholderQuery;

const DEFAULT_COLOR: &str = "4A90E2";
const DEFAULT_TEXT_COLOR: &str = "FFFFFF";
const DEFAULT_TEXT: &str = "Card Image";

pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "CardWise API Server is running!" }))
}

/// Keeps a colour only if it is 3 to 8 hex digits, without the `#`
fn hex_color(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().trim_start_matches('#').to_string())
        .filter(|v| (3..=8).contains(&v.len()) && v.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or_else(|| default.to_string())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders the placeholder SVG used for cards without photos
pub fn placeholder_svg(width: u32, height: u32, query: PlaceholderQuery) -> String {
    let color = hex_color(query.color, DEFAULT_COLOR);
    let text_color = hex_color(query.text_color, DEFAULT_TEXT_COLOR);
    let text = escape_xml(query.text.as_deref().unwrap_or(DEFAULT_TEXT));

    format!(
        concat!(
            r##"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg">"##,
            r##"<rect width="100%" height="100%" fill="#{color}"/>"##,
            r##"<text x="50%" y="50%" font-family="Arial, sans-serif" font-size="14" fill="#{text_color}" "##,
            r##"text-anchor="middle" dominant-baseline="middle">{text}</text>"##,
            "</svg>"
        ),
        w = width,
        h = height,
        color = color,
        text_color = text_color,
        text = text,
    )
}

/// Handler for `GET /api/placeholder/{width}/{height}`
pub async fn placeholder_handler(
    Path((width, height)): Path<(u32, u32)>,
    Query(query): Query<PlaceholderQuery>,
) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        placeholder_svg(width, height, query),
    )
}

pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    debug!("404 request: {}", uri);
    (StatusCode::NOT_FOUND, "Page not found.")
}
