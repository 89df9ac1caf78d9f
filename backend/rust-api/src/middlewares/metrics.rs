use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency per method and route template.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_template(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Replaces game ids, session codes and player ids with their placeholder so
/// the label set stays bounded.
fn route_template(path: &str) -> String {
    let mut previous = "";
    let mut normalized = Vec::new();

    for segment in path.split('/') {
        let placeholder = match previous {
            "games" => Some("{game_id}"),
            "sessions" | "join" if !segment.is_empty() => Some("{session_id}"),
            "play" if segment != "join" && !segment.is_empty() => Some("{player_id}"),
            _ => None,
        };
        normalized.push(placeholder.unwrap_or(segment));
        previous = segment;
    }

    normalized.join("/")
}
