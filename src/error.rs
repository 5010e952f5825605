use crate::command::CommandError;
use crate::connman::error::ConnManError;
use crate::variant::VariantError;
use std::io;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    ConnMan(#[from] ConnManError),

    /// A call the daemon failed, with what the tool was doing at the time.
    #[error("error {action}: {source}")]
    Operation {
        action: &'static str,
        #[source]
        source: ConnManError,
    },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("unexpected service data: {0}")]
    Decode(#[from] VariantError),

    #[error("could not render output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not write output: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    /// Wrap a bus error with the action that failed.
    pub fn operation(action: &'static str) -> impl FnOnce(ConnManError) -> AppError {
        move |source| AppError::Operation { action, source }
    }

    /// Every failure ends the invocation with status 1.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::ConnMan(_)
            | AppError::Operation { .. }
            | AppError::Command(_)
            | AppError::Decode(_)
            | AppError::Json(_)
            | AppError::Output(_) => ExitCode::FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
