use super::ProxyState;
use crate::ghpath::simplify_path;
use crate::proxy::context::{full_body, BoxBody};
use hyper::{Request, Response, StatusCode};

/// Route an admin request. Generic over the body since no endpoint reads it.
pub fn handle_admin<B>(req: Request<B>, state: &ProxyState) -> Response<BoxBody> {
    match req.uri().path() {
        "/health" | "/healthz" => json_response(StatusCode::OK, r#"{"status":"ok"}"#.to_string()),

        "/metrics" => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/plain; version=0.0.4; charset=utf-8")
            .body(full_body(state.metrics.render()))
            .unwrap_or_else(|_| Response::new(full_body(""))),

        "/simplify" => match query_param(req.uri().query(), "path") {
            Some(path) => {
                let resolution = simplify_path(&path);
                let body = serde_json::json!({
                    "path": path.as_str(),
                    "template": resolution.as_str(),
                    "matched": resolution.is_match(),
                });
                json_response(StatusCode::OK, body.to_string())
            }
            None => json_response(
                StatusCode::BAD_REQUEST,
                r#"{"error":"missing path parameter"}"#.to_string(),
            ),
        },

        _ => json_response(StatusCode::NOT_FOUND, r#"{"error":"not found"}"#.to_string()),
    }
}

fn json_response(status: StatusCode, body: String) -> Response<BoxBody> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(full_body(body))
        .unwrap_or_else(|_| Response::new(full_body("")))
}

/// Percent-decoded value of `key` in a query string. A value that does not
/// decode to UTF-8 counts as absent.
fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| urlencoding::decode(k).is_ok_and(|k| k == key))
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.into_owned())
}
