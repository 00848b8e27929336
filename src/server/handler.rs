// src/server/handler.rs
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

use crate::relay::ProductsRelay;

/// Routes `GET`/`HEAD <mount_path>` to the products relay; everything else is 404.
#[derive(Clone)]
pub struct RequestHandler {
    relay: Arc<ProductsRelay>,
    mount_path: Arc<str>,
}

impl RequestHandler {
    pub fn new(relay: Arc<ProductsRelay>, mount_path: &str) -> Self {
        let trimmed = mount_path.trim_end_matches('/');
        let mount_path = if trimmed.is_empty() { "/" } else { trimmed };
        Self {
            relay,
            mount_path: Arc::from(mount_path),
        }
    }

    fn matches(&self, req: &Request<Body>) -> bool {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return false;
        }
        let path = req.uri().path();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        path == &*self.mount_path
    }
}

fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::from("Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let span = tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        );

        if !self.matches(&req) {
            return Box::pin(
                async move {
                    tracing::debug!("No route");
                    Ok(not_found())
                }
                .instrument(span),
            );
        }

        let relay = self.relay.clone();
        Box::pin(
            async move {
                let response = relay.handle(req).await;
                tracing::debug!(status = %response.status(), "Request complete");
                Ok(response)
            }
            .instrument(span),
        )
    }
}
