//! Logging: um único destino (stdout ou arquivo), configurado uma vez.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Destino das linhas de log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    /// Truncado na inicialização
    File(PathBuf),
}

impl LogSink {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => LogSink::File(path),
            None => LogSink::Stdout,
        }
    }
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::Stdout => f.write_str("stdout"),
            LogSink::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Filtro: `debug` com `-d`, senão `RUST_LOG` ou `info`.
fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    }
}

/// Instala o subscriber global.
pub fn init(debug: bool, sink: &LogSink) -> std::io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));

    match sink {
        LogSink::Stdout => builder.init(),
        LogSink::File(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
    }

    Ok(())
}
