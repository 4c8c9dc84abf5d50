mod support;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::models::NivelAcesso;
use support::TestApp;

#[tokio::test]
async fn commercial_lookups_are_restricted_by_access_level() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Recepcionista).await;

    let (status, body) = app
        .post(
            "/api/consultas/comercial",
            &token,
            json!({"tipo_consulta": "cnpj_comercial", "parametro_consulta": "33647553000190"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"]["message"],
        "Este usuário não possui nível de acesso para esta consulta."
    );
}

#[tokio::test]
async fn relationships_lookup_records_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/empresas"))
        .and(body_json(json!({"q": "doc{33647553000190}", "Datasets": "relationships"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Result": [{"Relationships": {"CurrentRelationships": []}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Comercial).await;

    let (status, body) = app
        .post(
            "/api/consultas/comercial",
            &token,
            json!({"tipo_consulta": "cnpj_comercial", "parametro_consulta": "33.647.553/0001-90"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["mensagem"], "Consulta de CNPJ realizada com sucesso.");
    let historico = app.store.historico();
    assert_eq!(historico[0].tipo_consulta, "cnpj_comercial");
    assert_eq!(historico[0].parametro_consulta, "33647553000190");
}

#[tokio::test]
async fn contact_lookup_rejects_other_types() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Admin).await;

    let (status, body) = app
        .post(
            "/api/consultas/cont-comercial",
            &token,
            json!({"tipo_consulta": "cpf", "parametro_consulta": "12345678909"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Tipo de consulta inválido para esta rota.");
}

#[tokio::test]
async fn contact_lookup_uses_registration_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pessoas"))
        .and(body_json(json!({"q": "doc{12345678909}", "Datasets": "registration_data"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Result": []})))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Comercial).await;

    let (status, body) = app
        .post(
            "/api/consultas/cont-comercial",
            &token,
            json!({"tipo_consulta": "comercial", "parametro_consulta": "123.456.789-09"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["mensagem"],
        "Consulta de contato comercial realizada com sucesso."
    );
}

#[tokio::test]
async fn region_search_merges_cnaes_and_skips_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/minhareceita/"))
        .and(query_param("cnae", "6821801"))
        .and(query_param("uf", "SP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"razao_social": "IMOB A", "municipio": "CAMPINAS", "bairro": "CENTRO", "cnae_fiscal": 6821801},
            {"razao_social": "IMOB B", "municipio": "SANTOS", "bairro": "CENTRO"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/minhareceita/"))
        .and(query_param("cnae", "6821802"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/minhareceita/"))
        .and(query_param("cnae", "6822600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"nome_fantasia": "ADM C", "municipio": "Campinas", "bairro": "Cambuí"}]
        })))
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Usuario).await;

    let (status, body) = app
        .post(
            "/api/consultas/comercial-regiao",
            &token,
            json!({"uf": "sp", "cidade": "campinas"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let mut nomes: Vec<(String, String)> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["nome"].as_str().unwrap().to_string(), e["tipo"].as_str().unwrap().to_string()))
        .collect();
    nomes.sort();
    assert_eq!(
        nomes,
        vec![
            ("ADM C".to_string(), "Administradora".to_string()),
            ("IMOB A".to_string(), "Imobiliária".to_string()),
        ]
    );

    let (status, body) = app
        .post(
            "/api/consultas/comercial-regiao",
            &token,
            json!({"uf": "SP", "cidade": "Campinas", "bairro": "centro"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["nome"], "IMOB A");
}

#[tokio::test]
async fn region_search_requires_state_and_city() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let (_, token) = app.login_as(NivelAcesso::Usuario).await;

    let (status, body) = app
        .post("/api/consultas/comercial-regiao", &token, json!({"uf": "SP"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "UF e Cidade são obrigatórios para a pesquisa."
    );
}
