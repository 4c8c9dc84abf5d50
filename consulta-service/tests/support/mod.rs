//! In-memory stores and request helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use common::config::{AppConfig, BigDataCredentials, ProviderUrls};
use common::errors::AppResult;
use common::models::consulta::tipo_display;
use common::models::{HistoricoItem, NivelAcesso};
use common::token::{TokenSubject, TokenType};
use consulta_service::repository::{
    Agendamento, AgendamentoRepository, CotacaoRepository, DadosAgendamento, HistoricoRepository,
    NovaCotacao, NovoHistorico, NovoUsuario, Responsavel, Stores, UsuarioRecord,
    UsuarioRepository,
};
use consulta_service::service::auth::hash_password;
use consulta_service::{create_router, AppState};

#[derive(Default)]
pub struct MemoryStore {
    pub usuarios: Mutex<Vec<UsuarioRecord>>,
    pub historico: Mutex<Vec<HistoricoItem>>,
    pub cotacoes: Mutex<Vec<(i64, NovaCotacao, DateTime<Utc>)>>,
    pub agenda: Mutex<Vec<(i64, i64, DadosAgendamento)>>,
}

impl MemoryStore {
    pub fn historico(&self) -> Vec<HistoricoItem> {
        self.historico.lock().unwrap().clone()
    }

    fn responsavel(&self, id: i64) -> Option<Responsavel> {
        self.usuarios
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| Responsavel {
                id: u.id,
                email: u.email.clone(),
                nome_completo: u.nome_completo.clone(),
            })
    }

    fn agendamento(&self, id: i64, responsavel: i64, dados: &DadosAgendamento) -> Agendamento {
        Agendamento {
            id,
            empresa: dados.empresa.clone(),
            data: dados.data,
            responsavel: self.responsavel(responsavel),
            status: dados.status.clone(),
            hora: dados.hora,
            obs: dados.obs.clone(),
            motivo_cancelamento: dados.motivo_cancelamento.clone(),
        }
    }
}

#[async_trait]
impl UsuarioRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UsuarioRecord>> {
        Ok(self
            .usuarios
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<UsuarioRecord>> {
        Ok(self
            .usuarios
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, novo: NovoUsuario) -> AppResult<UsuarioRecord> {
        let mut usuarios = self.usuarios.lock().unwrap();
        let record = UsuarioRecord {
            id: usuarios.len() as i64 + 1,
            email: novo.email,
            nome_completo: novo.nome_completo,
            cpf: novo.cpf,
            nivel_acesso: novo.nivel_acesso,
            password_hash: novo.password_hash,
            is_active: true,
            is_fed: false,
            data_criacao: Utc::now(),
        };
        usuarios.push(record.clone());
        Ok(record)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()> {
        if let Some(u) = self.usuarios.lock().unwrap().iter_mut().find(|u| u.id == id) {
            u.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl HistoricoRepository for MemoryStore {
    async fn insert(&self, novo: NovoHistorico) -> AppResult<HistoricoItem> {
        let mut historico = self.historico.lock().unwrap();
        let item = HistoricoItem {
            id: historico.len() as i64 + 1,
            usuario: novo.usuario,
            usuario_email: novo.usuario_email,
            tipo_consulta_display: tipo_display(&novo.tipo_consulta),
            tipo_consulta: novo.tipo_consulta,
            origem: novo.origem,
            parametro_consulta: novo.parametro_consulta,
            data_consulta: Utc::now(),
            resultado: novo.resultado,
            lote_id: novo.lote_id,
        };
        historico.push(item.clone());
        Ok(item)
    }

    async fn list(
        &self,
        usuario: Option<i64>,
        page: u32,
        page_size: u32,
    ) -> AppResult<(Vec<HistoricoItem>, u64)> {
        let historico = self.historico.lock().unwrap();
        let filtrados: Vec<HistoricoItem> = historico
            .iter()
            .rev()
            .filter(|h| usuario.is_none() || h.usuario == usuario)
            .cloned()
            .collect();
        let total = filtrados.len() as u64;
        let skip = ((page - 1) * page_size) as usize;
        let items = filtrados
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();
        Ok((items, total))
    }

    async fn get(&self, id: i64) -> AppResult<Option<HistoricoItem>> {
        Ok(self
            .historico
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }
}

#[async_trait]
impl CotacaoRepository for MemoryStore {
    async fn insert(&self, nova: NovaCotacao) -> AppResult<(i64, DateTime<Utc>)> {
        let mut cotacoes = self.cotacoes.lock().unwrap();
        let id = cotacoes.len() as i64 + 1;
        let agora = Utc::now();
        cotacoes.push((id, nova, agora));
        Ok((id, agora))
    }
}

#[async_trait]
impl AgendamentoRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Agendamento>> {
        let agenda = self.agenda.lock().unwrap().clone();
        Ok(agenda
            .iter()
            .map(|(id, resp, dados)| self.agendamento(*id, *resp, dados))
            .collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Agendamento>> {
        let agenda = self.agenda.lock().unwrap().clone();
        Ok(agenda
            .iter()
            .find(|(i, _, _)| *i == id)
            .map(|(id, resp, dados)| self.agendamento(*id, *resp, dados)))
    }

    async fn create(&self, responsavel: i64, dados: DadosAgendamento) -> AppResult<Agendamento> {
        let id = {
            let mut agenda = self.agenda.lock().unwrap();
            let id = agenda.iter().map(|(i, _, _)| *i).max().unwrap_or(0) + 1;
            agenda.push((id, responsavel, dados.clone()));
            id
        };
        Ok(self.agendamento(id, responsavel, &dados))
    }

    async fn update(&self, id: i64, dados: DadosAgendamento) -> AppResult<Option<Agendamento>> {
        let responsavel = {
            let mut agenda = self.agenda.lock().unwrap();
            match agenda.iter_mut().find(|(i, _, _)| *i == id) {
                Some(entry) => {
                    entry.2 = dados.clone();
                    entry.1
                }
                None => return Ok(None),
            }
        };
        Ok(Some(self.agendamento(id, responsavel, &dados)))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut agenda = self.agenda.lock().unwrap();
        let antes = agenda.len();
        agenda.retain(|(i, _, _)| *i != id);
        Ok(agenda.len() != antes)
    }
}

/// Config whose providers all point at `server`.
pub fn test_config(server: &MockServer) -> AppConfig {
    let uri = server.uri();
    let mut config = AppConfig::default();
    config.jwt.secret = "test-secret".into();
    config.providers = ProviderUrls {
        brasilapi_cep: format!("{uri}/cep/"),
        brasilapi_cnpj: format!("{uri}/cnpj/"),
        bigdata_pessoas: format!("{uri}/pessoas"),
        bigdata_empresas: format!("{uri}/empresas"),
        viacep: format!("{uri}/viacep"),
        minhareceita: format!("{uri}/minhareceita/"),
        webhook: format!("{uri}/webhook/"),
        faturas_bridge: format!("{uri}/bridge"),
    };
    config.bigdata = BigDataCredentials {
        access_token: Some("token".into()),
        token_id: Some("token-id".into()),
    };
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(test_config(server))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::default());
        let stores = Stores {
            usuarios: store.clone(),
            historico: store.clone(),
            cotacoes: store.clone(),
            agenda: store.clone(),
        };
        let state = AppState::new(config, stores).expect("state");
        Self {
            router: create_router(state.clone()),
            state,
            store,
        }
    }

    pub async fn seed_user(&self, email: &str, password: &str, nivel: NivelAcesso) -> UsuarioRecord {
        UsuarioRepository::create(
            self.store.as_ref(),
            NovoUsuario {
                email: email.into(),
                nome_completo: format!("Usuário {email}"),
                cpf: None,
                nivel_acesso: nivel,
                password_hash: hash_password(password).expect("hash"),
            },
        )
        .await
        .expect("seed user")
    }

    /// Access token for an existing user.
    pub fn token_for(&self, user: &UsuarioRecord) -> String {
        self.state
            .tokens
            .issue(
                &TokenSubject {
                    user_id: user.id,
                    email: user.email.clone(),
                    nivel_acesso: user.nivel_acesso,
                },
                TokenType::Access,
            )
            .expect("token")
    }

    /// Seeds a user with `nivel` and returns its access token.
    pub async fn login_as(&self, nivel: NivelAcesso) -> (UsuarioRecord, String) {
        let email = format!("{}-{}@bigcorp.test", nivel.as_str(), self.store.usuarios.lock().unwrap().len());
        let user = self.seed_user(&email, "senha-segura", nivel).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
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
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }
}
