//! Comando local executado a cada alerta.
//!
//! A string vem do operador (arquivo de configuração) e vai direto para o
//! shell, sem sanitização.

use std::process::{Command, ExitStatus};

#[derive(Debug, thiserror::Error)]
pub enum LocalCommandError {
    #[error("Falha ao iniciar o shell: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Comando terminou com {0}")]
    Failed(ExitStatus),
}

/// Executa `command` no shell e espera terminar.
pub fn run(command: &str) -> Result<(), LocalCommandError> {
    let status = shell(command).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(LocalCommandError::Failed(status))
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
