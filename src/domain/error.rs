// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wrong network: connected to {current}, expected one of {expected:?}")]
    WrongNetwork { current: u64, expected: Vec<u64> },

    #[error("Insufficient allowance. Required: {required}, Approved: {available}")]
    InsufficientAllowance { required: String, available: String },

    #[error("Insufficient funds. Required: {required}, Available: {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("Transaction failed: {hash:?}, reason: {reason}")]
    Transaction { hash: String, reason: String },

    #[error("External API error: {provider} responded with {status}")]
    ApiCall { provider: String, status: u16 },

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Address {0} is invalid or not checksummed")]
    InvalidAddress(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short, user-facing notification text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::WalletNotConnected => "Please connect your wallet first".to_string(),
            AppError::WrongNetwork { .. } => {
                "Please switch to BNB Smart Chain to continue".to_string()
            }
            AppError::InsufficientAllowance { .. } => {
                "Please approve the token spend first".to_string()
            }
            AppError::InsufficientFunds { .. } => "Insufficient balance".to_string(),
            // Provider errors are surfaced verbatim.
            AppError::Transaction { reason, .. } => reason.clone(),
            AppError::Validation { field, message } => format!("{field}: {message}"),
            AppError::Workflow(msg) => msg.clone(),
            AppError::ApiCall { .. } | AppError::Connection(_) => {
                "Network request failed, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
