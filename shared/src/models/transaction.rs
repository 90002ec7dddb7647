//! Cash transaction models

use serde::{Deserialize, Serialize};

/// Direction of a cash transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Money coming in
    #[default]
    Intro,
    /// Money going out
    Exit,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Intro => "intro",
            TransactionStatus::Exit => "exit",
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "intro" => Ok(TransactionStatus::Intro),
            "exit" => Ok(TransactionStatus::Exit),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}
