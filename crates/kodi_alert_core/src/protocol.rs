//! Protocolo JSON-RPC 2.0 do Kodi.
//!
//! Requisição (HTTP POST em `http://<host>:<port>/jsonrpc`):
//!
//! ```text
//! {"jsonrpc":"2.0","method":"GUI.ShowNotification","params":{...},"id":1}
//! ```
//!
//! Resposta de sucesso: `{"id":1,"jsonrpc":"2.0","result":"OK"}`.
//! Qualquer outro `result`, ou um objeto `error`, é falha.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Versão do JSON-RPC.
pub const JSONRPC_VERSION: &str = "2.0";

/// Id fixo: só existe uma requisição em voo por vez.
pub const REQUEST_ID: u32 = 1;

/// Duração da notificação na tela (ms).
pub const NOTIFICATION_DISPLAY_MS: u32 = 2000;

/// Métodos usados.
pub const METHOD_SHOW_NOTIFICATION: &str = "GUI.ShowNotification";
pub const METHOD_EXECUTE_ADDON: &str = "Addons.ExecuteAddon";

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Resposta JSON inválida: {0}")]
    Deserialize(String),

    #[error("Erro JSON-RPC {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("Resultado inesperado: {0}")]
    UnexpectedResult(String),
}

/// Requisição JSON-RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u32,
}

impl RpcRequest {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
            id: REQUEST_ID,
        }
    }

    /// `GUI.ShowNotification` com duração fixa.
    pub fn show_notification(title: &str, message: &str) -> Self {
        let params = ShowNotificationParams {
            title: title.into(),
            message: message.into(),
            displaytime: NOTIFICATION_DISPLAY_MS,
        };
        Self::new(METHOD_SHOW_NOTIFICATION, to_params(&params))
    }

    /// `Addons.ExecuteAddon` para o addon informado.
    pub fn execute_addon(addon_id: &str) -> Self {
        let params = ExecuteAddonParams {
            addonid: addon_id.into(),
        };
        Self::new(METHOD_EXECUTE_ADDON, to_params(&params))
    }

    /// Serializa o corpo da requisição.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Serialize(e.to_string()))
    }
}

/// Parâmetros de `GUI.ShowNotification`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowNotificationParams {
    pub title: String,
    pub message: String,
    pub displaytime: u32,
}

/// Parâmetros de `Addons.ExecuteAddon`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteAddonParams {
    pub addonid: String,
}

/// Objeto `error` de uma resposta JSON-RPC.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Resposta JSON-RPC (campos irrelevantes são ignorados).
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

fn to_params<T: Serialize>(params: &T) -> Value {
    // Structs com campos String/u32 sempre serializam
    serde_json::to_value(params).unwrap_or(Value::Null)
}

/// Monta a URL do endpoint JSON-RPC.
pub fn endpoint_url(host: &str, port: u16) -> String {
    if host.contains(':') {
        // IPv6 literal
        format!("http://[{host}]:{port}/jsonrpc")
    } else {
        format!("http://{host}:{port}/jsonrpc")
    }
}

impl RpcResponse {
    /// Exige `result == "OK"` e nenhum `error`.
    pub fn into_result(self) -> Result<(), ProtocolError> {
        if let Some(err) = self.error {
            return Err(ProtocolError::Remote {
                code: err.code,
                message: err.message,
            });
        }

        match self.result {
            Some(Value::String(s)) if s == "OK" => Ok(()),
            Some(other) => Err(ProtocolError::UnexpectedResult(other.to_string())),
            None => Err(ProtocolError::UnexpectedResult("<ausente>".into())),
        }
    }
}

/// Decodifica a resposta e exige `result == "OK"`.
pub fn decode_response(body: &[u8]) -> Result<(), ProtocolError> {
    let response: RpcResponse =
        serde_json::from_slice(body).map_err(|e| ProtocolError::Deserialize(e.to_string()))?;
    response.into_result()
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
