//! # Kodi Alert Listener
//!
//! Escuta um receptor 433 MHz no GPIO e, ao receber o código de alerta
//! configurado, executa um comando local, mostra uma notificação no Kodi
//! e dispara um addon via JSON-RPC.
//!
//! ## Uso
//! ```bash
//! kodi_alert_listener -c /etc/kodi_alert.toml          # Normal
//! kodi_alert_listener -c /etc/kodi_alert.toml -t       # Só um alerta de teste
//! kodi_alert_listener -d -l /var/log/kodi_alert.log    # Debug em arquivo
//! ```
//!
//! ## Códigos de saída
//! - `0` – término normal ou alerta de teste enviado
//! - `1` – configuração (ou arquivo de log) inválida
//! - `2` – falha ao instalar o handler de sinais, ao adquirir o GPIO ou
//!   erro do receptor durante o loop

mod cli;
mod kodi;
mod listener;
mod local;
mod logging;
mod rf_device;

use clap::Parser;
use cli::Args;
use kodi::KodiClient;
use kodi_alert_core::config::AlertConfig;
use kodi_alert_core::detector::AlertDetector;
use listener::{KodiAlertActions, POLL_INTERVAL};
use logging::LogSink;
use rf_device::RfDevice;
use std::process::ExitCode;
use tracing::{debug, error, info};

const EXIT_CONFIG: u8 = 1;
const EXIT_RECEIVER: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // ── Logging ──
    let sink = LogSink::from_option(args.log_file.clone());
    if let Err(e) = logging::init(args.debug, &sink) {
        eprintln!("Não foi possível abrir o arquivo de log {sink}: {e}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let config_path = args.config.clone().unwrap_or_else(AlertConfig::default_path);

    debug!("Debug:       {}", args.debug);
    debug!("Log:         {sink}");
    debug!("Config:      {}", config_path.display());
    debug!("Addon ID:    {}", args.addon_id);

    // ── Carregar config ──
    let config = match AlertConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let client = match KodiClient::new(&config.kodi, &args.addon_id) {
        Ok(client) => client,
        Err(e) => {
            error!("Não foi possível criar o cliente HTTP: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // ── Modo teste ──
    if args.test {
        info!("Modo teste: enviando um alerta para {}", config.kodi.hostname);
        client.alert(&config.notification.title, &config.notification.text);
        return ExitCode::SUCCESS;
    }

    // ── SIGINT / SIGTERM ──
    // Sem handler o GPIO não seria liberado no Ctrl+C
    let stop = match listener::install_stop_handler() {
        Ok(stop) => stop,
        Err(e) => {
            error!("Falha ao instalar handler de sinais: {e}");
            return ExitCode::from(EXIT_RECEIVER);
        }
    };

    // ── Receptor RF ──
    let mut device = match RfDevice::open(config.gpio_rxdata) {
        Ok(device) => device,
        Err(e) => {
            error!("Não foi possível abrir o receptor no GPIO {}: {e}", config.gpio_rxdata);
            return ExitCode::from(EXIT_RECEIVER);
        }
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📡 KODI RF ALERT – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  GPIO:    {}", config.gpio_rxdata);
    println!("  Código:  {}", config.alert_code);
    println!("  Kodi:    {}:{}", config.kodi.hostname, config.kodi.port);
    println!("  Addon:   {}", client.addon_id());
    println!("══════════════════════════════════════════════");
    println!();

    let mut actions = KodiAlertActions::new(&config, client);
    let mut detector = AlertDetector::new(config.alert_code);

    // ── Loop principal ──
    let result = listener::run(
        &mut device,
        &mut actions,
        &mut detector,
        &stop,
        POLL_INTERVAL,
    );

    // Libera o GPIO antes de sair, com ou sem erro
    drop(device);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Abortado devido a erro: \"{e}\"");
            ExitCode::from(EXIT_RECEIVER)
        }
    }
}
