//! Loop de polling: receptor → detector → ações.

use crate::kodi::KodiClient;
use crate::local;
use crate::rf_device::{RfError, RfReceiver};
use kodi_alert_core::config::{AlertConfig, NotificationConfig};
use kodi_alert_core::detector::{AlertDetector, Observation};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

/// Intervalo entre leituras do receptor.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Efeitos colaterais de um alerta, na ordem em que o loop os chama.
pub trait AlertActions {
    /// Best-effort: falhas são só logadas.
    fn run_local_command(&mut self);
    /// Notificação + addon no Kodi.
    fn send_alert(&mut self);
}

/// Ações reais: shell local + Kodi.
pub struct KodiAlertActions {
    client: KodiClient,
    notification: NotificationConfig,
    local_command: String,
}

impl KodiAlertActions {
    pub fn new(config: &AlertConfig, client: KodiClient) -> Self {
        Self {
            client,
            notification: config.notification.clone(),
            local_command: config.local_command.clone(),
        }
    }
}

impl AlertActions for KodiAlertActions {
    fn run_local_command(&mut self) {
        if self.local_command.is_empty() {
            return;
        }
        debug!("Executando comando local '{}'", self.local_command);
        if let Err(e) = local::run(&self.local_command) {
            error!("Não foi possível executar o comando local '{}': {e}", self.local_command);
        }
    }

    fn send_alert(&mut self) {
        self.client
            .alert(&self.notification.title, &self.notification.text);
    }
}

/// Instala o handler de SIGINT/SIGTERM que levanta a flag de parada.
///
/// Só pode ser chamado uma vez por processo.
pub fn install_stop_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    Ok(stop)
}

/// Roda até `stop` ser sinalizado ou o receptor falhar.
///
/// O chamador é dono do receptor e o libera depois, em ambos os casos.
pub fn run<R, A>(
    receiver: &mut R,
    actions: &mut A,
    detector: &mut AlertDetector,
    stop: &AtomicBool,
    poll_interval: Duration,
) -> Result<(), RfError>
where
    R: RfReceiver,
    A: AlertActions,
{
    info!("Escutando códigos RF ...");

    while !stop.load(Ordering::SeqCst) {
        match detector.observe(receiver.last_reading()?) {
            Observation::NoSignal => {}
            Observation::Ignored(reading) => debug!("{reading}"),
            Observation::Alert(reading) => {
                debug!("{reading}");
                info!(
                    "Sinal 433 MHz recebido com o código de alerta {}",
                    detector.alert_code()
                );
                debug!("Estado: {}", detector.state());
                actions.run_local_command();
                actions.send_alert();
                detector.acknowledge();
                debug!("Estado: {}", detector.state());
            }
        }

        std::thread::sleep(poll_interval);
    }

    info!("Interrompido pelo usuário ou pelo sistema.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kodi_alert_core::detector::DetectorState;
    use kodi_alert_core::types::RfReading;
    use std::collections::VecDeque;

    /// Receptor que devolve leituras pré-definidas e depois pede parada.
    struct ScriptedReceiver {
        script: VecDeque<Result<Option<RfReading>, RfError>>,
        stop: Arc<AtomicBool>,
        polls: usize,
    }

    impl ScriptedReceiver {
        fn new(script: Vec<Result<Option<RfReading>, RfError>>, stop: Arc<AtomicBool>) -> Self {
            Self {
                script: script.into(),
                stop,
                polls: 0,
            }
        }
    }

    impl RfReceiver for ScriptedReceiver {
        fn last_reading(&mut self) -> Result<Option<RfReading>, RfError> {
            self.polls += 1;
            match self.script.pop_front() {
                Some(step) => step,
                None => {
                    self.stop.store(true, Ordering::SeqCst);
                    Ok(None)
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingActions {
        calls: Vec<&'static str>,
    }

    impl AlertActions for RecordingActions {
        fn run_local_command(&mut self) {
            self.calls.push("local");
        }

        fn send_alert(&mut self) {
            self.calls.push("alert");
        }
    }

    fn reading(code: u64, timestamp: u64) -> Result<Option<RfReading>, RfError> {
        Ok(Some(RfReading {
            code,
            pulse_length: 350,
            protocol: 1,
            bit_length: 24,
            timestamp,
        }))
    }

    fn run_script(
        alert_code: u64,
        script: Vec<Result<Option<RfReading>, RfError>>,
    ) -> (Result<(), RfError>, RecordingActions, AlertDetector) {
        let stop = Arc::new(AtomicBool::new(false));
        let mut receiver = ScriptedReceiver::new(script, Arc::clone(&stop));
        let mut actions = RecordingActions::default();
        let mut detector = AlertDetector::new(alert_code);
        let result = run(
            &mut receiver,
            &mut actions,
            &mut detector,
            &stop,
            Duration::ZERO,
        );
        (result, actions, detector)
    }

    #[test]
    fn matching_code_dispatches_once_in_order() {
        let (result, actions, detector) = run_script(
            4321,
            vec![reading(4321, 1), reading(4321, 1), reading(9999, 2)],
        );
        assert!(result.is_ok());
        assert_eq!(actions.calls, ["local", "alert"]);
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn unchanged_timestamp_never_retriggers() {
        let script = (0..50).map(|_| reading(4321, 7)).collect();
        let (_, actions, _) = run_script(4321, script);
        assert_eq!(actions.calls, ["local", "alert"]);
    }

    #[test]
    fn other_codes_never_dispatch() {
        let script = (1..50).map(|ts| reading(9999, ts)).collect();
        let (result, actions, detector) = run_script(4321, script);
        assert!(result.is_ok());
        assert!(actions.calls.is_empty());
        assert_eq!(detector.last_code(), Some(9999));
    }

    #[test]
    fn every_new_matching_timestamp_dispatches() {
        let script = vec![Ok(None), reading(4321, 1), Ok(None), reading(4321, 2)];
        let (_, actions, _) = run_script(4321, script);
        assert_eq!(actions.calls, ["local", "alert", "local", "alert"]);
    }

    #[test]
    fn receiver_error_aborts_loop() {
        let (result, actions, _) = run_script(4321, vec![reading(1, 1), Err(RfError::Poisoned)]);
        assert!(matches!(result, Err(RfError::Poisoned)));
        assert!(actions.calls.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn kodi_actions_survive_kodi_being_down() {
        use kodi_alert_core::config::KodiConfig;

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("alert");
        let closed_port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = AlertConfig {
            kodi: KodiConfig {
                hostname: "127.0.0.1".into(),
                port: closed_port,
                username: String::new(),
                password: String::new(),
            },
            gpio_rxdata: 27,
            alert_code: 4321,
            notification: NotificationConfig {
                title: "Alarme".into(),
                text: "Movimento".into(),
            },
            local_command: format!("touch '{}'", marker.display()),
        };
        let client = KodiClient::new(&config.kodi, "script.securitycam").unwrap();
        let mut actions = KodiAlertActions::new(&config, client);

        actions.run_local_command();
        actions.send_alert();

        assert!(marker.exists());
    }

    #[test]
    fn raised_stop_flag_ends_before_polling() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut receiver = ScriptedReceiver::new(vec![reading(4321, 1)], Arc::clone(&stop));
        let mut actions = RecordingActions::default();
        let mut detector = AlertDetector::new(4321);

        run(&mut receiver, &mut actions, &mut detector, &stop, POLL_INTERVAL).unwrap();

        assert_eq!(receiver.polls, 0);
        assert!(actions.calls.is_empty());
    }

    #[test]
    fn stop_handler_installs_once() {
        let stop = install_stop_handler().unwrap();
        assert!(!stop.load(Ordering::SeqCst));
        assert!(matches!(
            install_stop_handler(),
            Err(ctrlc::Error::MultipleHandlers)
        ));
    }
}
