//! Máquina de estados de detecção do código de alerta.
//!
//! ```text
//!            timestamp igual / código diferente
//!              ┌────────┐
//!              ▼        │
//!           ┌──────┐────┘   timestamp novo + código == alerta   ┌─────────┐
//!           │ IDLE │ ─────────────────────────────────────────▶  │ ALERTED │
//!           └──────┘ ◀─────────────────────────────────────────  └─────────┘
//!                                 acknowledge()
//! ```
//!
//! A leitura de hardware é a única entrada; o detector não faz I/O.

use crate::types::RfReading;

/// Estado do detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorState {
    #[default]
    Idle,
    Alerted,
}

impl std::fmt::Display for DetectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DetectorState::Idle => "IDLE",
            DetectorState::Alerted => "ALERTED",
        })
    }
}

/// Resultado de um tick de polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Nenhum código novo desde o último tick.
    NoSignal,
    /// Código novo, mas diferente do código de alerta.
    Ignored(RfReading),
    /// Código novo igual ao código de alerta: disparar ações.
    Alert(RfReading),
}

/// Compara leituras sucessivas do receptor com o código configurado.
#[derive(Debug, Clone)]
pub struct AlertDetector {
    alert_code: u64,
    state: DetectorState,
    last_timestamp: Option<u64>,
    last_code: Option<u64>,
}

impl AlertDetector {
    pub fn new(alert_code: u64) -> Self {
        Self {
            alert_code,
            state: DetectorState::Idle,
            last_timestamp: None,
            last_code: None,
        }
    }

    pub fn alert_code(&self) -> u64 {
        self.alert_code
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Último código visto (com timestamp novo).
    pub fn last_code(&self) -> Option<u64> {
        self.last_code
    }

    /// Processa a leitura atual do receptor.
    ///
    /// Só um timestamp diferente do anterior conta como sinal novo.
    pub fn observe(&mut self, reading: Option<RfReading>) -> Observation {
        let Some(reading) = reading else {
            return Observation::NoSignal;
        };

        if self.last_timestamp == Some(reading.timestamp) {
            return Observation::NoSignal;
        }

        self.last_timestamp = Some(reading.timestamp);
        self.last_code = Some(reading.code);

        if reading.code == self.alert_code {
            self.state = DetectorState::Alerted;
            Observation::Alert(reading)
        } else {
            Observation::Ignored(reading)
        }
    }

    /// Volta para IDLE depois que as ações do alerta foram despachadas.
    pub fn acknowledge(&mut self) {
        self.state = DetectorState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(code: u64, timestamp: u64) -> Option<RfReading> {
        Some(RfReading {
            code,
            pulse_length: 350,
            protocol: 1,
            bit_length: 24,
            timestamp,
        })
    }

    #[test]
    fn no_reading_is_no_signal() {
        let mut detector = AlertDetector::new(4321);
        assert_eq!(detector.observe(None), Observation::NoSignal);
        assert_eq!(detector.state(), DetectorState::Idle);
        assert_eq!(detector.last_code(), None);
    }

    #[test]
    fn matching_code_alerts_once_per_timestamp() {
        let mut detector = AlertDetector::new(4321);

        assert!(matches!(detector.observe(reading(4321, 1)), Observation::Alert(r) if r.code == 4321));
        assert_eq!(detector.state(), DetectorState::Alerted);
        detector.acknowledge();
        assert_eq!(detector.state(), DetectorState::Idle);

        // Mesmo timestamp: não dispara de novo
        for _ in 0..5 {
            assert_eq!(detector.observe(reading(4321, 1)), Observation::NoSignal);
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn other_codes_never_alert() {
        let mut detector = AlertDetector::new(4321);
        for ts in 1..20 {
            let obs = detector.observe(reading(9999, ts));
            assert!(matches!(obs, Observation::Ignored(_)));
        }
        assert_eq!(detector.state(), DetectorState::Idle);
        assert_eq!(detector.last_code(), Some(9999));
    }

    #[test]
    fn example_sequence() {
        let mut detector = AlertDetector::new(4321);
        let alerts = [reading(4321, 100), reading(4321, 100), reading(9999, 200)]
            .into_iter()
            .filter(|r| {
                let alerted = matches!(detector.observe(*r), Observation::Alert(_));
                detector.acknowledge();
                alerted
            })
            .count();
        assert_eq!(alerts, 1);
    }

    #[test]
    fn same_code_new_timestamp_alerts_again() {
        let mut detector = AlertDetector::new(7);
        assert!(matches!(detector.observe(reading(7, 1)), Observation::Alert(_)));
        detector.acknowledge();
        assert!(matches!(detector.observe(reading(7, 2)), Observation::Alert(_)));
    }

    #[test]
    fn state_display() {
        let mut detector = AlertDetector::new(4321);
        assert_eq!(detector.state().to_string(), "IDLE");
        detector.observe(Some(RfReading {
            code: 4321,
            timestamp: 1,
            ..RfReading::default()
        }));
        assert_eq!(detector.state().to_string(), "ALERTED");
        detector.acknowledge();
        assert_eq!(detector.state().to_string(), "IDLE");
    }
}
