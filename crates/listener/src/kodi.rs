//! Cliente JSON-RPC do Kodi.
//!
//! Toda falha aqui é logada e engolida: o loop de RF precisa continuar
//! rodando mesmo com o Kodi desligado.

use kodi_alert_core::config::KodiConfig;
use kodi_alert_core::protocol::{ProtocolError, RpcRequest, RpcResponse, endpoint_url};
use reqwest::blocking::Client;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout do teste de conexão com a porta HTTP.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout de cada chamada JSON-RPC.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Erros de uma chamada.
#[derive(Debug, thiserror::Error)]
pub enum KodiError {
    #[error("Erro HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Status HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Diz se `host:port` aceita conexões TCP.
type ReachabilityCheck = fn(&str, u16) -> bool;

/// Cliente para um único host Kodi.
pub struct KodiClient {
    reachable: ReachabilityCheck,
    http: Client,
    hostname: String,
    port: u16,
    url: String,
    credentials: Option<(String, String)>,
    addon_id: String,
}

impl KodiClient {
    pub fn new(config: &KodiConfig, addon_id: &str) -> Result<Self, KodiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()?;

        Ok(Self {
            reachable: port_accepts_connections,
            http,
            hostname: config.hostname.clone(),
            port: config.port,
            url: endpoint_url(&config.hostname, config.port),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            addon_id: addon_id.to_string(),
        })
    }

    pub fn addon_id(&self) -> &str {
        &self.addon_id
    }

    /// Troca o teste de porta (usado nos testes).
    #[cfg(test)]
    fn with_reachability(mut self, check: ReachabilityCheck) -> Self {
        self.reachable = check;
        self
    }

    /// Testa se a porta HTTP do Kodi aceita conexões.
    pub fn host_is_up(&self) -> bool {
        (self.reachable)(&self.hostname, self.port)
    }

    /// Envia uma requisição e exige `result == "OK"`.
    pub fn request(&self, request: &RpcRequest) -> Result<(), KodiError> {
        let mut builder = self.http.post(&self.url).json(request);
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(KodiError::Status(status));
        }

        response.json::<RpcResponse>()?.into_result()?;
        Ok(())
    }

    /// Notificação (se houver título e texto) + execução do addon.
    pub fn alert(&self, title: &str, message: &str) {
        if !self.host_is_up() {
            info!("Host {} está fora do ar. Requisições canceladas.", self.hostname);
            return;
        }

        if !title.is_empty() && !message.is_empty() {
            info!("Enviando notificação '{title}: {message}' ...");
            self.call(&RpcRequest::show_notification(title, message));
        }

        info!("Solicitando execução do addon '{}' ...", self.addon_id);
        self.call(&RpcRequest::execute_addon(&self.addon_id));
    }

    fn call(&self, request: &RpcRequest) -> bool {
        match self.request(request) {
            Ok(()) => {
                debug!("{} → OK", request.method);
                true
            }
            Err(e) => {
                warn!("{} falhou: {e}", request.method);
                false
            }
        }
    }
}

fn port_accepts_connections(hostname: &str, port: u16) -> bool {
    let addrs = match (hostname, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!("Não foi possível resolver {hostname}: {e}");
            return false;
        }
    };

    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
}

// ──────────────────────────────────────────────
// Testes (Kodi falso via wiremock)
// ──────────────────────────────────────────────
