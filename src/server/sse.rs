use axum::body::{ Body, Bytes };
use axum::http::{ header, HeaderValue };
use axum::response::{ IntoResponse, Response };
use serde_json::json;
use std::convert::Infallible;

pub const EVENT_STREAM: &str = "text/event-stream";

/// The two frames sent in place of a completion when a request fails:
/// a data frame carrying `{"error": message}`, then an empty `error` event.
pub fn error_frames(message: &str) -> [Bytes; 2] {
    [
        Bytes::from(format!("data: {}\n\n", json!({ "error": message }))),
        Bytes::from_static(b"event: error\ndata: \n\n"),
    ]
}

/// 200 response whose body is the two error frames; the body ends after the second frame.
pub fn error_stream_response(message: &str) -> Response {
    let frames = error_frames(message).map(Ok::<_, Infallible>);
    event_stream(Body::from_stream(tokio_stream::iter(frames)))
}

pub fn event_stream(body: Body) -> Response {
    ([(header::CONTENT_TYPE, HeaderValue::from_static(EVENT_STREAM))], body).into_response()
}
