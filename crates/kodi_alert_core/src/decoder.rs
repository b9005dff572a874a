//! Decodificador de trens de pulso 433 MHz.
//!
//! Recebe o instante (µs) de cada borda do pino de dados do receptor e
//! reconstrói o código transmitido. Segue o esquema dos controles remotos
//! baratos (PT2262/EV1527 e similares):
//!
//! ```text
//!   bit 0:  ▔|___       (zero_high × T, zero_low × T)
//!   bit 1:  ▔▔▔|_       (one_high × T,  one_low × T)
//!   sync:   ▔|_______…  (sync_high × T, sync_low × T)
//! ```
//!
//! Um código só é aceito depois de o mesmo gap de sincronismo ser visto
//! repetido, o que descarta a maior parte do ruído de RF.

use crate::types::RfReading;
use tracing::debug;

/// Parâmetros de um protocolo, em múltiplos da largura de pulso base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    /// Largura de pulso base nominal (µs)
    pub pulse_length: u32,
    pub sync_high: u32,
    pub sync_low: u32,
    pub zero_high: u32,
    pub zero_low: u32,
    pub one_high: u32,
    pub one_low: u32,
}

const fn protocol(pulse_length: u32, timings: [u32; 6]) -> Protocol {
    Protocol {
        pulse_length,
        sync_high: timings[0],
        sync_low: timings[1],
        zero_high: timings[2],
        zero_low: timings[3],
        one_high: timings[4],
        one_low: timings[5],
    }
}

/// Protocolos conhecidos. O número do protocolo é o índice + 1.
pub const PROTOCOLS: [Protocol; 6] = [
    protocol(350, [1, 31, 1, 3, 3, 1]),
    protocol(650, [1, 10, 1, 2, 2, 1]),
    protocol(100, [30, 71, 4, 11, 9, 6]),
    protocol(380, [1, 6, 1, 3, 3, 1]),
    protocol(500, [6, 14, 1, 2, 2, 1]),
    protocol(200, [1, 10, 1, 5, 1, 1]),
];

/// Máximo de bordas guardadas entre dois gaps de sincronismo.
pub const MAX_CHANGES: usize = 67;

/// Tolerância padrão (% da largura de pulso).
pub const DEFAULT_TOLERANCE: u32 = 80;

/// Durações acima disso são tratadas como gap de sincronismo (µs).
const SYNC_GAP_MIN_US: u64 = 5000;

/// Variação aceita entre dois gaps consecutivos (µs).
const SYNC_GAP_JITTER_US: u64 = 200;

/// Máquina de decodificação alimentada borda a borda.
#[derive(Debug, Clone)]
pub struct PulseDecoder {
    tolerance: u32,
    timings: [u64; MAX_CHANGES],
    change_count: usize,
    repeat_count: u32,
    last_edge: u64,
    latest: Option<RfReading>,
}

impl Default for PulseDecoder {
    fn default() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }
}

impl PulseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria um decodificador com tolerância customizada (% da largura de pulso).
    pub fn with_tolerance(tolerance: u32) -> Self {
        Self {
            tolerance,
            timings: [0; MAX_CHANGES],
            change_count: 0,
            repeat_count: 0,
            last_edge: 0,
            latest: None,
        }
    }

    /// Última leitura decodificada (sobrescrita a cada novo código).
    pub fn latest(&self) -> Option<RfReading> {
        self.latest
    }

    /// Processa uma borda no instante `timestamp` (µs).
    ///
    /// Retorna `Some` apenas na borda em que um código é decodificado.
    pub fn on_edge(&mut self, timestamp: u64) -> Option<RfReading> {
        let duration = timestamp.saturating_sub(self.last_edge);
        let mut decoded = None;

        if duration > SYNC_GAP_MIN_US {
            if duration.abs_diff(self.timings[0]) < SYNC_GAP_JITTER_US {
                self.repeat_count += 1;
                self.change_count = self.change_count.saturating_sub(1);

                if self.repeat_count == 2 {
                    decoded = self.decode(timestamp);
                    if let Some(reading) = decoded {
                        debug!("RX {reading}");
                        self.latest = Some(reading);
                    }
                    self.repeat_count = 0;
                }
            }
            self.change_count = 0;
        }

        if self.change_count >= MAX_CHANGES {
            self.change_count = 0;
            self.repeat_count = 0;
        }

        self.timings[self.change_count] = duration;
        self.change_count += 1;
        self.last_edge = timestamp;

        decoded
    }

    /// Tenta cada protocolo, na ordem da tabela.
    fn decode(&self, timestamp: u64) -> Option<RfReading> {
        // Menos que isso não forma nem 3 bits
        if self.change_count <= 6 {
            return None;
        }

        PROTOCOLS
            .iter()
            .zip(1u8..)
            .find_map(|(proto, number)| self.match_waveform(proto, number, timestamp))
    }

    fn match_waveform(&self, proto: &Protocol, number: u8, timestamp: u64) -> Option<RfReading> {
        let delay = self.timings[0] / u64::from(proto.sync_low);
        let tolerance = delay * u64::from(self.tolerance) / 100;
        let near = |value: u64, units: u32| value.abs_diff(delay * u64::from(units)) < tolerance;

        let mut code: u64 = 0;
        for pair in self.timings[1..self.change_count].chunks_exact(2) {
            let (high, low) = (pair[0], pair[1]);
            if near(high, proto.zero_high) && near(low, proto.zero_low) {
                code <<= 1;
            } else if near(high, proto.one_high) && near(low, proto.one_low) {
                code = (code << 1) | 1;
            } else {
                return None;
            }
        }

        if code == 0 {
            return None;
        }

        Some(RfReading {
            code,
            pulse_length: u32::try_from(delay).unwrap_or(u32::MAX),
            protocol: number,
            bit_length: (self.change_count / 2) as u32,
            timestamp,
        })
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
