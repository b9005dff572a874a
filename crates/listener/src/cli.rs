//! Argumentos de linha de comando.

use clap::Parser;
use std::path::PathBuf;

/// Addon executado no Kodi quando nenhum é informado.
pub const DEFAULT_ADDON_ID: &str = "script.securitycam";

/// Envia uma notificação a um host Kodi e dispara a execução de um addon
/// ao receber um sinal externo de 433 MHz.
#[derive(Debug, Clone, Parser)]
#[command(name = "kodi_alert_listener", version, about)]
pub struct Args {
    /// Mostra mensagens de debug
    #[arg(short, long)]
    pub debug: bool,

    /// Arquivo de log (padrão: stdout)
    #[arg(short = 'l', long = "logfile", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Arquivo de configuração (padrão: kodi_alert.toml ao lado do executável)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Id do addon a executar
    #[arg(short = 'a', long = "addonid", value_name = "ID", default_value = DEFAULT_ADDON_ID)]
    pub addon_id: String,

    /// Envia um alerta de teste e sai
    #[arg(short, long)]
    pub test: bool,
}
