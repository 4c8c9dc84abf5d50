mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::MockServer;

use common::models::NivelAcesso;
use consulta_service::service::AuthService;
use support::TestApp;

#[tokio::test]
async fn login_refresh_and_me() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    app.seed_user("ana@bigcorp.test", "senha-segura", NivelAcesso::Comercial)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ANA@bigcorp.test", "password": "senha-segura"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["nivel_acesso"], "comercial");
    let access = body["data"]["access"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/users/me", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@bigcorp.test");

    // A refresh token is not accepted as an access token.
    let (status, _) = app.get("/api/users/me", &refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access"].is_string());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    app.seed_user("bia@bigcorp.test", "senha-segura", NivelAcesso::Usuario)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "bia@bigcorp.test", "password": "errada"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Credenciais inválidas.");
}

#[tokio::test]
async fn password_change() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let user = app
        .seed_user("caio@bigcorp.test", "senha-antiga", NivelAcesso::Usuario)
        .await;
    let token = app.token_for(&user);

    let (status, body) = app
        .post(
            "/api/users/password",
            &token,
            json!({"old_password": "outra", "new_password": "senha-nova-123"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Senha antiga incorreta.");

    let (status, _) = app
        .post(
            "/api/users/password",
            &token,
            json!({"old_password": "senha-antiga", "new_password": "curta"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/users/password",
            &token,
            json!({"old_password": "senha-antiga", "new_password": "senha-nova-123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mensagem"], "Senha alterada com sucesso.");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "caio@bigcorp.test", "password": "senha-nova-123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_admin_is_idempotent() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    let service = AuthService::new(app.state.stores.usuarios.clone(), app.state.tokens.clone());

    service.ensure_admin("Admin@bigcorp.test", "admin-123").await.unwrap();
    service.ensure_admin("admin@bigcorp.test", "outra-senha").await.unwrap();

    let usuarios = app.store.usuarios.lock().unwrap();
    assert_eq!(usuarios.len(), 1);
    assert_eq!(usuarios[0].email, "admin@bigcorp.test");
    assert_eq!(usuarios[0].nivel_acesso, NivelAcesso::Admin);
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);

    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "consulta-service");

    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/consultas/realizar"].is_object());
}

#[tokio::test]
async fn deactivated_user_cannot_refresh() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server);
    app.seed_user("caio@bigcorp.test", "senha-segura", NivelAcesso::Usuario)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "caio@bigcorp.test", "password": "senha-segura"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let refresh = body["data"]["refresh"].as_str().unwrap().to_string();

    for usuario in app.store.usuarios.lock().unwrap().iter_mut() {
        usuario.is_active = false;
    }

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Usuário inativo ou inexistente.");
}
