mod support;

use axum::http::{header, Method, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::models::NivelAcesso;
use support::{envelope, envelope_erro, shared_strings, xlsx_part, TestApp};

#[tokio::test]
async fn templates_are_public_and_styled() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);

    let res = app
        .request(Method::GET, "/api/planilhas/modelo/cnpj", None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"planilha-modelo-cnpj.xlsx\""
    );
    assert!(res.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("spreadsheetml"));

    assert!(xlsx_part(&res.body, "xl/workbook.xml").contains("CNPJs para Consulta"));
    let strings = shared_strings(&res.body);
    for valor in ["CNPJ", "33.647.553/0001-90", "33649575000199", "41.096.250/0001-54"] {
        assert!(strings.contains(valor), "{valor}");
    }
    let styles = xlsx_part(&res.body, "xl/styles.xml");
    assert!(styles.contains("4F81BD"));

    let res = app
        .request(Method::GET, "/api/planilhas/modelo/rg", None, None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["success"], false);
}

#[tokio::test]
async fn processing_requires_a_token() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);

    let res = app
        .request(
            Method::POST,
            "/api/planilhas/processar/cpf",
            None,
            Some(json!({"cpfs": [{"CPF": "12345678909"}]})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_row_yields_one_result_row_in_order() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Usuario);

    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .and(header_eq("Authorization", format!("Bearer {token}").as_str()))
        .and(body_partial_json(json!({
            "tipo_consulta": "cpf",
            "parametro_consulta": "123.456.789-09",
            "origem": "planilha"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "Result": [{"BasicData": {
                "Name": "FULANO DE TAL",
                "TaxIdNumber": "12345678909",
                "BirthDate": "1980-05-12T00:00:00Z"
            }}]
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .and(body_partial_json(json!({"parametro_consulta": "000"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(envelope_erro(
            "VALIDATION_ERROR",
            "CPF deve conter 11 dígitos numéricos.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let res = app
        .request(
            Method::POST,
            "/api/planilhas/processar/cpf",
            Some(&token),
            Some(json!({"cpfs": [
                {"CPF": "123.456.789-09"},
                {"CPF": ""},
                {"CPF": "000"}
            ]})),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"planilha-resultado-cpf.xlsx\""
    );
    assert!(xlsx_part(&res.body, "xl/workbook.xml").contains("Resultados da Consulta CPF"));

    let strings = shared_strings(&res.body);
    let posicao = |texto: &str| strings.find(texto).unwrap_or_else(|| panic!("{texto} ausente"));
    assert!(posicao("CPF (Entrada)") < posicao("FULANO DE TAL"));
    assert!(posicao("1980-05-12") < posicao("CPF não fornecido na linha da planilha."));
    assert!(
        posicao("CPF não fornecido na linha da planilha.")
            < posicao("Erro na consulta à API (400): CPF deve conter 11 dígitos numéricos.")
    );
    assert!(strings.contains("SUCESSO"));
    assert!(strings.contains("FALHA"));

    // Every lookup of one upload shares the batch id.
    let requests = server.received_requests().await.unwrap();
    let lotes: Vec<Value> = requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap()["lote_id"].clone())
        .collect();
    assert_eq!(lotes.len(), 2);
    assert!(lotes[0].is_string());
    assert_eq!(lotes[0], lotes[1]);
}

#[tokio::test]
async fn manual_origin_has_no_batch_id() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Usuario);

    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .and(body_partial_json(json!({"tipo_consulta": "endereco", "origem": "manual"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "cep": "01310100",
            "street": "Avenida Paulista",
            "neighborhood": "Bela Vista",
            "city": "São Paulo",
            "state": "SP"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let res = app
        .request(
            Method::POST,
            "/api/planilhas/processar/cep",
            Some(&token),
            Some(json!({"ceps": [{"CEP": "01310-100"}], "origem": "manual"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(shared_strings(&res.body).contains("Avenida Paulista"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("lote_id").is_none());
}

#[tokio::test]
async fn unreachable_lookup_service_fails_rows_not_the_upload() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Usuario);

    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .respond_with(ResponseTemplate::new(503).set_body_string("indisponível"))
        .mount(&server)
        .await;

    let res = app
        .request(
            Method::POST,
            "/api/planilhas/processar/cnpj",
            Some(&token),
            Some(json!({"cnpjs": [{"CNPJ": "33.647.553/0001-90"}]})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let strings = shared_strings(&res.body);
    assert!(strings.contains("33.647.553/0001-90"));
    assert!(strings.contains("Erro na consulta à API (503)"));
}

#[tokio::test]
async fn oversized_error_text_still_yields_its_row() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let token = app.token(NivelAcesso::Usuario);

    Mock::given(method("POST"))
        .and(path("/api/consultas/realizar"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(40_000)))
        .mount(&server)
        .await;

    let res = app
        .request(
            Method::POST,
            "/api/planilhas/processar/cpf",
            Some(&token),
            Some(json!({"cpfs": [{"CPF": "12345678909"}, {"CPF": "98765432100"}]})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let strings = shared_strings(&res.body);
    assert!(strings.contains("12345678909"));
    assert!(strings.contains("98765432100"));
    assert!(strings.contains("Erro na consulta à API (502): Resposta inesperada da API de consulta"));
}
