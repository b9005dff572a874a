//! # Kodi Alert Core
//!
//! Crate compartilhada que define a configuração, a decodificação de
//! sinais 433 MHz, a máquina de estados de detecção e o protocolo
//! JSON-RPC usado para alertar um host Kodi.
//!
//! Nada aqui toca GPIO ou rede: o binário `kodi_alert_listener` injeta
//! leituras de hardware e executa os efeitos colaterais.
//!
//! ## Módulos
//! - [`config`] – Configuração TOML validada (host Kodi, GPIO, código de alerta…)
//! - [`types`] – Leitura decodificada do receptor RF
//! - [`decoder`] – Decodificador de trens de pulso (timings de borda → código)
//! - [`detector`] – Máquina de estados IDLE/ALERTED com debounce por timestamp
//! - [`protocol`] – Requisições/respostas JSON-RPC 2.0 do Kodi

pub mod types;
pub mod decoder;
pub mod detector;
pub mod protocol;
pub mod config;

// Re-exports convenientes
pub use types::RfReading;
pub use decoder::PulseDecoder;
pub use detector::{AlertDetector, DetectorState, Observation};
pub use config::{AlertConfig, ConfigError};
pub use protocol::{RpcRequest, ProtocolError, JSONRPC_VERSION};
