//! Tipos compartilhados entre o decodificador, o detector e o listener.

use serde::{Deserialize, Serialize};

/// Última leitura decodificada pelo receptor 433 MHz.
///
/// O receptor só substitui a leitura quando decodifica um novo código;
/// `timestamp` é o que distingue um sinal novo de uma leitura repetida.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RfReading {
    /// Código decodificado
    pub code: u64,
    /// Largura de pulso base estimada (µs)
    pub pulse_length: u32,
    /// Número do protocolo (1–6)
    pub protocol: u8,
    /// Quantidade de bits do código
    pub bit_length: u32,
    /// Instante da decodificação (µs, relógio do GPIO)
    pub timestamp: u64,
}

impl std::fmt::Display for RfReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [pulselength {}, protocol {}]",
            self.code, self.pulse_length, self.protocol
        )
    }
}
