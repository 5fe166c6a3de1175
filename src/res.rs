use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{html::push_html, Event};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Text made safe to place in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    push_html(&mut html, std::iter::once(Event::Text(text.into())));
    html.replace('"', "&quot;").replace('\'', "&#39;")
}

/// A JavaScript string literal, quotes included, for use inside `<script>`.
pub fn js_string(text: &str) -> String {
    serde_json::Value::from(text)
        .to_string()
        .replace('<', "\\u003c")
}

/// Replaces every `{key}` in one pass. Values are inserted verbatim and never
/// scanned again, so user text that looks like a placeholder stays as it is.
/// Braces that don't name a known key are left alone.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let found = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (end, *value))
        });

        match found {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Wraps a page body in the shared layout.
pub fn page(base: &str, title: &str, body: &str) -> String {
    fill(
        include_res!(str, "/pages/layout.html"),
        &[("base", base), ("title", &escape(title)), ("body", body)],
    )
}

pub fn link_box(link: &str) -> String {
    fill(
        include_res!(str, "/pages/link_box.html"),
        &[("link", &escape(link))],
    )
}

pub fn not_found(base: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(page(base, "Room not found", include_res!(str, "/pages/not_found.html"))),
    )
        .into_response()
}

pub fn error_page(status: StatusCode, message: &str) -> Response {
    let body = fill(
        include_res!(str, "/pages/error.html"),
        &[("message", &escape(message))],
    );
    (status, Html(page("", "Something went wrong", &body))).into_response()
}
