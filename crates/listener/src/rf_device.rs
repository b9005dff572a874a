//! Receptor 433 MHz ligado a um pino GPIO.
//!
//! A interrupção do GPIO (thread do `rppal`) alimenta o [`PulseDecoder`]
//! a cada borda; o loop principal só lê a última decodificação.
//! O pino é liberado no `Drop`, em qualquer caminho de saída.

use kodi_alert_core::decoder::PulseDecoder;
use kodi_alert_core::types::RfReading;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Erros do receptor.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    #[cfg(target_os = "linux")]
    #[error("Erro de GPIO: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("GPIO não suportado nesta plataforma")]
    Unsupported,

    #[error("Estado do decodificador corrompido (thread de interrupção abortou)")]
    Poisoned,
}

/// Fonte de leituras consultada pelo loop de polling.
pub trait RfReceiver {
    /// Última leitura decodificada, ou `None` se nada foi recebido ainda.
    fn last_reading(&mut self) -> Result<Option<RfReading>, RfError>;
}

/// Decodificador compartilhado entre a interrupção e o loop.
#[derive(Debug, Clone, Default)]
pub struct SharedDecoder(Arc<Mutex<PulseDecoder>>);

impl SharedDecoder {
    pub fn on_edge(&self, timestamp_us: u64) {
        // Com o mutex envenenado a leitura já reporta o erro
        if let Ok(mut decoder) = self.0.lock() {
            decoder.on_edge(timestamp_us);
        }
    }

    pub fn latest(&self) -> Result<Option<RfReading>, RfError> {
        self.0
            .lock()
            .map(|decoder| decoder.latest())
            .map_err(|_| RfError::Poisoned)
    }
}

/// Receptor RF em um pino BCM.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub struct RfDevice {
    pin_number: u8,
    decoder: SharedDecoder,
    #[cfg(target_os = "linux")]
    pin: rppal::gpio::InputPin,
}

impl RfDevice {
    /// Adquire o pino e habilita a recepção.
    #[cfg(target_os = "linux")]
    pub fn open(pin_number: u8) -> Result<Self, RfError> {
        use rppal::gpio::{Event, Gpio, Trigger};

        let mut pin = Gpio::new()?.get(pin_number)?.into_input();
        let decoder = SharedDecoder::default();
        let edges = decoder.clone();

        pin.set_async_interrupt(Trigger::Both, None, move |event: Event| {
            let micros = u64::try_from(event.timestamp.as_micros()).unwrap_or(u64::MAX);
            edges.on_edge(micros);
        })?;

        info!("RX habilitado no GPIO {pin_number}");
        Ok(Self {
            pin_number,
            decoder,
            pin,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(pin_number: u8) -> Result<Self, RfError> {
        tracing::error!("GPIO {pin_number}: recepção RF requer Linux");
        Err(RfError::Unsupported)
    }
}

impl RfReceiver for RfDevice {
    fn last_reading(&mut self) -> Result<Option<RfReading>, RfError> {
        self.decoder.latest()
    }
}

impl Drop for RfDevice {
    fn drop(&mut self) {
        #[cfg(target_os = "linux")]
        {
            if let Err(e) = self.pin.clear_async_interrupt() {
                tracing::warn!("Falha ao desabilitar interrupção do GPIO {}: {e}", self.pin_number);
            }
        }
        info!("GPIO {} liberado", self.pin_number);
    }
}
