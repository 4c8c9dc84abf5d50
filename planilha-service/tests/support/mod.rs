//! Router harness with consulta-service replaced by a mock server.

#![allow(dead_code)]

use std::io::{Cursor, Read};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;

use common::config::AppConfig;
use common::models::NivelAcesso;
use common::token::{TokenSubject, TokenType};
use planilha_service::{create_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct Resposta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Resposta {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub fn new(server: &MockServer) -> Self {
        let mut config = AppConfig::default();
        config.jwt.secret = "test-secret".into();
        config.services.consulta_service = server.uri();
        let state = AppState::new(config).expect("state");
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    pub fn token(&self, nivel: NivelAcesso) -> String {
        self.state
            .tokens
            .issue(
                &TokenSubject {
                    user_id: 7,
                    email: "operador@bigcorp.test".into(),
                    nivel_acesso: nivel,
                },
                TokenType::Access,
            )
            .expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Resposta {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        Resposta {
            status,
            headers,
            body,
        }
    }
}

/// Success envelope as consulta-service renders it.
pub fn envelope(resultado_api: Value) -> Value {
    json!({
        "success": true,
        "data": {
            "mensagem": "Consulta realizada com sucesso.",
            "resultado_api": resultado_api,
            "historico_salvo": {
                "id": 1,
                "usuario": 7,
                "tipo_consulta": "cpf",
                "tipo_consulta_display": "Consulta de CPF",
                "origem": "planilha",
                "parametro_consulta": "x",
                "data_consulta": "2026-01-01T00:00:00Z",
                "resultado": null,
                "lote_id": null
            },
            "origem": "planilha"
        },
        "meta": {"timestamp": "2026-01-01T00:00:00Z", "service": "consulta-service"}
    })
}

/// Error envelope as consulta-service renders it.
pub fn envelope_erro(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": {"code": code, "message": message},
        "meta": {"timestamp": "2026-01-01T00:00:00Z"}
    })
}

/// Reads one part of an `.xlsx` package.
pub fn xlsx_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("xlsx is a zip");
    let mut file = archive.by_name(name).expect("part present");
    let mut text = String::new();
    file.read_to_string(&mut text).expect("utf-8 part");
    text
}

pub fn shared_strings(bytes: &[u8]) -> String {
    xlsx_part(bytes, "xl/sharedStrings.xml")
}
