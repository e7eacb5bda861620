//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router of either hop
//! - Wire up middleware (tracing, timeouts, body limits, request ID)
//! - Build the outbound clients each hop needs
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    routing::{get, post},
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Role, ServiceConfig};
use crate::http::edge::{forward_handler, EdgeState};
use crate::http::request::{request_id, UuidRequestId};
use crate::http::resolution::{resolve_handler, ResolverState};
use crate::observability::Tracer;
use crate::pipeline::TemperaturePipeline;
use crate::providers::{http_client, BrasilApiProvider, ViaCepProvider};
use crate::resolver::RedundantResolver;
use crate::weather::WeatherApiClient;

/// Errors building a server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid resolver URL {url}: {reason}")]
    ResolverUrl { url: String, reason: String },
}

/// HTTP server for one hop.
pub struct HttpServer {
    router: Router,
    role: Role,
}

impl HttpServer {
    /// Build the edge hop: validates and forwards to the resolution hop.
    pub fn edge(config: &ServiceConfig, tracer: Tracer) -> Result<Self, ServerError> {
        let resolver_uri: Uri =
            config
                .edge
                .resolver_url
                .parse()
                .map_err(|e: axum::http::uri::InvalidUri| ServerError::ResolverUrl {
                    url: config.edge.resolver_url.clone(),
                    reason: e.to_string(),
                })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = EdgeState {
            client,
            resolver_uri,
            tracer,
            forward_timeout: Duration::from_secs(config.timeouts.forward_secs),
            max_body_bytes: config.edge.max_body_bytes,
        };

        let routes = Router::new()
            .route("/", post(forward_handler))
            .with_state(state.clone());
        let router = Self::build_router(
            routes,
            config,
            config.edge.max_body_bytes,
            state.tracer.service().to_string(),
        );
        Ok(Self {
            router,
            role: Role::Edge,
        })
    }

    /// Build the resolution hop with the real providers from `config`.
    pub fn resolver(config: &ServiceConfig, tracer: Tracer) -> Result<Self, ServerError> {
        let client = http_client(Duration::from_secs(config.timeouts.upstream_secs))?;
        let providers = &config.providers;

        let resolver = RedundantResolver::new(
            Arc::new(BrasilApiProvider::new(client.clone(), &providers.brasil_api_url)),
            Arc::new(ViaCepProvider::new(client.clone(), &providers.via_cep_url)),
            Duration::from_secs(config.timeouts.resolve_deadline_secs),
        );
        let weather = Arc::new(WeatherApiClient::new(
            client,
            &providers.weather_api_url,
            &providers.weather_api_key,
        ));

        Ok(Self::with_pipeline(
            config,
            TemperaturePipeline::new(resolver, weather),
            tracer,
        ))
    }

    /// Build the resolution hop around an existing pipeline.
    pub fn with_pipeline(config: &ServiceConfig, pipeline: TemperaturePipeline, tracer: Tracer) -> Self {
        let service = tracer.service().to_string();
        let routes = Router::new()
            .route("/", post(resolve_handler))
            .with_state(ResolverState { pipeline, tracer });
        let router = Self::build_router(routes, config, config.resolver.max_body_bytes, service);
        Self {
            router,
            role: Role::Resolver,
        }
    }

    /// Add the health route and all middleware layers.
    #[allow(deprecated)]
    fn build_router(routes: Router, config: &ServiceConfig, max_body_bytes: usize, service: String) -> Router {
        routes
            .route("/health", get(health_handler).with_state(Arc::<str>::from(service)))
            .layer(RequestBodyLimitLayer::new(max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            role = %self.role,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!(role = %self.role, "HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    service: String,
}

async fn health_handler(State(service): State<Arc<str>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        service: service.to_string(),
    })
}
