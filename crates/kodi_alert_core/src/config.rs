//! Configuração via TOML (ou o INI legado).
//!
//! Mantém as seções do antigo `.ini` (nomes com espaço vão entre aspas):
//!
//! ```toml
//! ["KODI JSON-RPC"]
//! hostname = "kodi.home.lan"
//! port = 8080
//! username = ""
//! password = ""
//!
//! [GPIO]
//! rxdata = 27
//!
//! ["RF Alert"]
//! code = 4321
//!
//! ["Alert Notification"]
//! title = "Alarme"
//! text = "Movimento no portão"
//!
//! [Local]
//! command = ""
//! ```
//!
//! O layout `.ini` antigo (cabeçalhos sem aspas, valores crus) também é
//! aceito: arquivos `.ini`/`.cfg` vão direto para o parser INI, e qualquer
//! outro arquivo que não seja TOML válido é relido como INI.
//!
//! Todas as chaves são obrigatórias. Inteiros podem vir como número ou
//! como string numérica.

use ini::{Ini, ParseOption};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Nome do arquivo de configuração padrão.
pub const DEFAULT_FILE_NAME: &str = "kodi_alert.toml";

/// Erros de carga/validação. Todos são fatais na inicialização.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Arquivo de configuração '{0}' não encontrado")]
    NotFound(PathBuf),

    #[error("Erro ao ler {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Erro ao parsear configuração: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Erro ao parsear configuração INI: {0}")]
    Ini(#[from] ini::ParseError),

    #[error("Chave ausente: [{section}] {key}")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("Valor inválido em [{section}] {key}: {value:?}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

// ──────────────────────────────────────────────
// Configuração validada
// ──────────────────────────────────────────────

/// Conexão JSON-RPC com o host Kodi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KodiConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl KodiConfig {
    /// Credenciais para basic auth, só se ambas estiverem preenchidas.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }
}

/// Texto da notificação exibida no Kodi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub title: String,
    pub text: String,
}

/// Configuração completa, imutável após a carga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub kodi: KodiConfig,
    /// Pino BCM ligado ao DATA do receptor
    pub gpio_rxdata: u8,
    /// Código RF que dispara o alerta
    pub alert_code: u64,
    pub notification: NotificationConfig,
    /// Comando local executado a cada alerta (vazio = nenhum)
    pub local_command: String,
}

// ──────────────────────────────────────────────
// Formato bruto do arquivo
// ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInt {
    Int(i64),
    Text(String),
}

impl RawInt {
    fn parse<T>(&self, section: &'static str, key: &'static str) -> Result<T, ConfigError>
    where
        T: TryFrom<i64> + std::str::FromStr,
    {
        let parsed = match self {
            RawInt::Int(n) => T::try_from(*n).ok(),
            RawInt::Text(s) => s.trim().parse::<T>().ok(),
        };
        parsed.ok_or_else(|| ConfigError::InvalidValue {
            section,
            key,
            value: self.to_string(),
        })
    }
}

impl std::fmt::Display for RawInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawInt::Int(n) => write!(f, "{n}"),
            RawInt::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(rename = "KODI JSON-RPC")]
    kodi: RawKodi,
    #[serde(rename = "GPIO")]
    gpio: RawGpio,
    #[serde(rename = "RF Alert")]
    rf_alert: RawRfAlert,
    #[serde(rename = "Alert Notification")]
    notification: RawNotification,
    #[serde(rename = "Local")]
    local: RawLocal,
}

#[derive(Debug, Deserialize)]
struct RawKodi {
    hostname: String,
    port: RawInt,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RawGpio {
    rxdata: RawInt,
}

#[derive(Debug, Deserialize)]
struct RawRfAlert {
    code: RawInt,
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    title: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawLocal {
    command: String,
}

/// Formato do arquivo de configuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Ini,
    /// TOML, relido como INI se a sintaxe não for TOML
    Auto,
}

impl ConfigFormat {
    /// `.ini`/`.cfg` → INI, `.toml` → TOML, o resto é detectado pelo conteúdo.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ini") || ext.eq_ignore_ascii_case("cfg") => {
                ConfigFormat::Ini
            }
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Auto,
        }
    }
}

/// Remove um par de aspas externas (`"x"` ou `'x'`).
fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

impl AlertConfig {
    /// Carrega e valida a configuração de um arquivo (TOML ou INI).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        info!("Lendo configuração de {} ...", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content, ConfigFormat::from_path(path))?;
        info!("Configuração OK.");
        Ok(config)
    }

    /// Parseia e valida `content` no formato indicado.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => Self::from_toml(content),
            ConfigFormat::Ini => Self::from_ini(content),
            ConfigFormat::Auto => match content.parse::<toml::Table>() {
                Ok(table) => Self::from_raw(toml::Value::Table(table).try_into()?),
                Err(e) => {
                    debug!("Conteúdo não é TOML ({e}); lendo como INI");
                    Self::from_ini(content)
                }
            },
        }
    }

    /// Parseia e valida o conteúdo TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::from_raw(toml::from_str(content)?)
    }

    /// Parseia e valida o layout INI (seções e valores sem aspas).
    pub fn from_ini(content: &str) -> Result<Self, ConfigError> {
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)?;

        let get = |section: &'static str, key: &'static str| -> Result<String, ConfigError> {
            ini.section(Some(section))
                .and_then(|props| props.get(key))
                .map(|value| unquote(value).to_string())
                .ok_or(ConfigError::MissingKey { section, key })
        };

        Self::from_raw(RawFile {
            kodi: RawKodi {
                hostname: get("KODI JSON-RPC", "hostname")?,
                port: RawInt::Text(get("KODI JSON-RPC", "port")?),
                username: get("KODI JSON-RPC", "username")?,
                password: get("KODI JSON-RPC", "password")?,
            },
            gpio: RawGpio {
                rxdata: RawInt::Text(get("GPIO", "rxdata")?),
            },
            rf_alert: RawRfAlert {
                code: RawInt::Text(get("RF Alert", "code")?),
            },
            notification: RawNotification {
                title: get("Alert Notification", "title")?,
                text: get("Alert Notification", "text")?,
            },
            local: RawLocal {
                command: get("Local", "command")?,
            },
        })
    }

    fn from_raw(raw: RawFile) -> Result<Self, ConfigError> {
        let hostname = raw.kodi.hostname.trim().to_string();
        if !is_valid_host(&hostname) {
            return Err(ConfigError::InvalidValue {
                section: "KODI JSON-RPC",
                key: "hostname",
                value: hostname,
            });
        }

        let port: u16 = raw.kodi.port.parse("KODI JSON-RPC", "port")?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                section: "KODI JSON-RPC",
                key: "port",
                value: "0".into(),
            });
        }

        let config = AlertConfig {
            kodi: KodiConfig {
                hostname,
                port,
                username: raw.kodi.username,
                password: raw.kodi.password,
            },
            gpio_rxdata: raw.gpio.rxdata.parse("GPIO", "rxdata")?,
            alert_code: raw.rf_alert.code.parse("RF Alert", "code")?,
            notification: NotificationConfig {
                title: raw.notification.title,
                text: raw.notification.text,
            },
            local_command: raw.local.command.trim().to_string(),
        };

        debug!(
            "Kodi {}:{} | GPIO {} | código {} | auth {}",
            config.kodi.hostname,
            config.kodi.port,
            config.gpio_rxdata,
            config.alert_code,
            config.kodi.credentials().is_some()
        );
        Ok(config)
    }

    /// Retorna o caminho padrão (ao lado do executável).
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join(DEFAULT_FILE_NAME)
    }
}

/// Aceita literais IPv4/IPv6 ou nomes RFC 1123.
///
/// Substitui a checagem antiga de "três segmentos separados por ponto",
/// que recusava `localhost` e aceitava `a..b`.
pub fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }

    let name = host.strip_suffix('.').unwrap_or(host);
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    // Um nome todo numérico seria um IPv4 malformado
    if name.split('.').all(|label| label.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
