use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{Method, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::Request;
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::echo::EchoRecord;

pub type EchoResponse = Response<Full<Bytes>>;

/// Reflect a request back to the caller as an [`EchoRecord`].
///
/// `GET`, `POST` and `HEAD` are echoed; any other method gets `501`.
pub async fn handle(
    req: Request<Incoming>,
    raw_head: watch::Receiver<Option<Bytes>>,
    peer: SocketAddr,
) -> Result<EchoResponse, Infallible> {
    let (parts, body) = req.into_parts();

    let body_len = match body.collect().await {
        Ok(collected) => collected.to_bytes().len(),
        Err(e) => {
            warn!(%peer, error = %e, "failed to read request body");
            0
        }
    };

    let response = if matches!(parts.method, Method::GET | Method::POST | Method::HEAD) {
        let head = raw_head.borrow().clone();
        let record = EchoRecord::capture(&parts, head.as_deref(), peer);
        match serde_json::to_vec_pretty(&record) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(e) => {
                warn!(%peer, error = %e, "failed to serialize echo record");
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    } else {
        let body = json!({
            "error": "unsupported method",
            "method": parts.method.as_str(),
        });
        json_response(
            StatusCode::NOT_IMPLEMENTED,
            serde_json::to_vec_pretty(&body).unwrap_or_default(),
        )
    };

    info!(
        %peer,
        method = %parts.method,
        path = %parts.uri,
        status = response.status().as_u16(),
        body_bytes = body_len,
        "request"
    );

    Ok(response)
}

fn json_response(status: StatusCode, body: Vec<u8>) -> EchoResponse {
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    resp
}

fn status_only(status: StatusCode) -> EchoResponse {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}
