mod support;

use axum::http::{header, Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::models::NivelAcesso;
use support::{envelope, envelope_erro, shared_strings, xlsx_part, TestApp};

const CNPJ: &str = "33647553000190";

async fn mock_relacionamentos(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/consultas/comercial"))
        .and(body_partial_json(json!({
            "tipo_consulta": "cnpj_comercial",
            "parametro_consulta": CNPJ,
            "origem": "massa"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "Result": [{"Relationships": {"CurrentRelationships": [
                {"RelationshipType": "QSA", "RelatedEntityTaxIdType": "CPF",
                 "RelatedEntityTaxIdNumber": "12345678909", "RelatedEntityName": "ANA SOCIA",
                 "RelationshipName": "Sócio-Administrador"},
                {"RelationshipType": "EMPLOYMENT", "RelatedEntityTaxIdType": "CPF",
                 "RelatedEntityTaxIdNumber": "98765432100"}
            ]}}]
        }))))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn partners_are_looked_up_with_their_contacts() {
    let server = MockServer::start().await;
    mock_relacionamentos(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .and(body_partial_json(json!({"tipo_consulta": "cnpj", "parametro_consulta": CNPJ})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"razao_social": "EMPRESA EXEMPLO LTDA"}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/cont-comercial"))
        .and(body_partial_json(json!({
            "tipo_consulta": "comercial",
            "parametro_consulta": "12345678909",
            "origem": "massa"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "Result": [{"RegistrationData": {
                "BasicData": {"Name": "ANA SOCIA", "BirthDate": "1975-03-09T00:00:00Z"},
                "Emails": {"Primary": {"EmailAddress": "ana@exemplo.com"}},
                "Phones": {"Primary": {"CountryCode": "55", "AreaCode": "11", "Number": "999998888"}},
                "Addresses": {"Primary": {
                    "Typology": "RUA", "AddressMain": "DAS FLORES", "Number": "10",
                    "Neighborhood": "CENTRO", "City": "CAMPINAS", "State": "SP", "ZipCode": "13000000"
                }}
            }}]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Comercial);
    let res = app
        .request(
            Method::POST,
            "/api/planilhas/consulta-massa-comercial",
            Some(&token),
            Some(json!({"cnpjs": ["33.647.553/0001-90", "123"]})),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"resultados_consulta_massa_cpf.xlsx\""
    );
    assert!(xlsx_part(&res.body, "xl/workbook.xml").contains("Resultados CPF"));

    let strings = shared_strings(&res.body);
    for valor in [
        "CNPJ Original",
        "Detalhes Consulta CPF",
        "EMPRESA EXEMPLO LTDA",
        "12345678909",
        "Qsa",
        "09/03/1975",
        "ana@exemplo.com",
        "+55 (11) 999998888",
        "RUA DAS FLORES, 10 - CENTRO, CAMPINAS/SP - 13000000",
        "Sucesso",
        "CNPJ inválido ou vazio após limpeza.",
    ] {
        assert!(strings.contains(valor), "{valor} ausente");
    }
    assert!(!strings.contains("98765432100"));
}

#[tokio::test]
async fn failed_company_name_and_missing_partners_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/comercial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "Result": [{"Relationships": {"CurrentRelationships": []}}]
        }))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .respond_with(ResponseTemplate::new(503).set_body_json(envelope_erro(
            "EXTERNAL_SERVICE_ERROR",
            "BrasilAPI indisponível",
        )))
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Admin);
    let res = app
        .request(
            Method::POST,
            "/api/planilhas/consulta-massa-comercial",
            Some(&token),
            Some(json!({"cnpjs": [CNPJ]})),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let strings = shared_strings(&res.body);
    assert!(strings.contains("Erro BrasilAPI"));
    assert!(strings.contains("Aviso"));
    assert!(strings.contains("Nenhum CPF relevante encontrado para este CNPJ"));
}

#[tokio::test]
async fn relationship_failures_become_error_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/comercial"))
        .respond_with(ResponseTemplate::new(500).set_body_json(envelope_erro(
            "CONFIG_ERROR",
            "Credenciais da BigDataCorp não configuradas.",
        )))
        .mount(&server)
        .await;

    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Comercial);
    let res = app
        .request(
            Method::POST,
            "/api/planilhas/consulta-massa-comercial",
            Some(&token),
            Some(json!({"cnpjs": [CNPJ]})),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let strings = shared_strings(&res.body);
    assert!(strings.contains("Erro CNPJ"));
    assert!(strings.contains("Credenciais da BigDataCorp não configuradas."));
}

#[tokio::test]
async fn bulk_consultation_is_restricted_and_validated() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);

    let token = app.token(NivelAcesso::Usuario);
    let res = app
        .request(
            Method::POST,
            "/api/planilhas/consulta-massa-comercial",
            Some(&token),
            Some(json!({"cnpjs": [CNPJ]})),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.json()["error"]["message"],
        "Este usuário não possui nível de acesso para esta consulta em massa."
    );

    let token = app.token(NivelAcesso::Comercial);
    let res = app
        .request(
            Method::POST,
            "/api/planilhas/consulta-massa-comercial",
            Some(&token),
            Some(json!({"cnpjs": []})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"]["code"], "VALIDATION_ERROR");

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
