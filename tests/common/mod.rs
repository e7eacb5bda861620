//! Shared utilities for the two-hop integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cep_temp::observability::Tracer;
use cep_temp::{HttpServer, ServiceConfig, Shutdown};

/// Mocked upstream providers: two geocoders and the weather service.
pub struct Upstreams {
    pub brasil_api: MockServer,
    pub via_cep: MockServer,
    pub weather: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            brasil_api: MockServer::start().await,
            via_cep: MockServer::start().await,
            weather: MockServer::start().await,
        }
    }

    /// BrasilAPI answers `cep` with `city` after `delay`.
    pub async fn brasil_api_city(&self, cep: &str, city: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cep/v1/{cep}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "cep": cep,
                        "state": "SP",
                        "city": city,
                        "neighborhood": "Centro",
                        "street": "Rua Um",
                    }))
                    .set_delay(delay),
            )
            .mount(&self.brasil_api)
            .await;
    }

    pub async fn brasil_api_not_found(&self, cep: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/api/cep/v1/{cep}")))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "name": "CepPromiseError", "message": "not found" }))
                    .set_delay(delay),
            )
            .mount(&self.brasil_api)
            .await;
    }

    pub async fn via_cep_city(&self, cep: &str, city: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{cep}/json")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "cep": cep,
                        "logradouro": "Rua Um",
                        "bairro": "Centro",
                        "localidade": city,
                        "uf": "SP",
                    }))
                    .set_delay(delay),
            )
            .mount(&self.via_cep)
            .await;
    }

    pub async fn via_cep_not_found(&self, cep: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{cep}/json")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "erro": true }))
                    .set_delay(delay),
            )
            .mount(&self.via_cep)
            .await;
    }

    pub async fn weather_celsius(&self, celsius: f64) {
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": { "name": "ignored" },
                "current": { "temp_c": celsius, "temp_f": 0.0 },
            })))
            .mount(&self.weather)
            .await;
    }

    pub async fn weather_failing(&self) {
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.weather)
            .await;
    }

    /// Requests seen by both geocoders so far.
    pub async fn provider_calls(&self) -> usize {
        let brasil = self.brasil_api.received_requests().await.unwrap_or_default();
        let via = self.via_cep.received_requests().await.unwrap_or_default();
        brasil.len() + via.len()
    }

    /// Config pointing the resolution hop at these mocks.
    pub fn config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.providers.brasil_api_url = format!("{}/api/cep/v1", self.brasil_api.uri());
        config.providers.via_cep_url = format!("{}/ws", self.via_cep.uri());
        config.providers.weather_api_url = format!("{}/v1", self.weather.uri());
        config.providers.weather_api_key = "test-key".to_string();
        config
    }
}

/// A running server and the handle to stop it.
pub struct Running {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Running {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

/// Serve `server` on an ephemeral local port.
pub async fn spawn(server: HttpServer) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stopped = shutdown.wait();
    let handle = tokio::spawn(server.run(listener, stopped));
    Running {
        addr,
        shutdown,
        handle,
    }
}

/// Both hops wired together.
pub struct Stack {
    pub edge: Running,
    pub resolver: Running,
}

pub async fn start_stack(config: ServiceConfig) -> Stack {
    let resolver = spawn(
        HttpServer::resolver(&config, Tracer::new("cep-resolver", false)).unwrap(),
    )
    .await;
    let edge = start_edge(&config, &resolver.url()).await;
    Stack { edge, resolver }
}

/// Start an edge hop forwarding to `resolver_url`.
pub async fn start_edge(config: &ServiceConfig, resolver_url: &str) -> Running {
    let mut config = config.clone();
    config.edge.resolver_url = resolver_url.to_string();
    spawn(HttpServer::edge(&config, Tracer::new("cep-edge", false)).unwrap()).await
}

/// POST `{"cep": cep}` and return status and raw body.
pub async fn post_cep(url: &str, cep: &str) -> (u16, String) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&json!({ "cep": cep }))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}
