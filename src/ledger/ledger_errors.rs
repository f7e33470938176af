use solana_rpc_client_api::{
    client_error::{Error as ClientError, ErrorKind as ClientErrorKind},
    request::RpcError,
};
use thiserror::Error;

/// Ledger node error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// The request or the node timed out
    #[error("Timeout: {message} (endpoint: {endpoint})")]
    Timeout { endpoint: String, message: String },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    #[error("Blockhash not found: {message} (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String, message: String },

    /// The payer cannot cover fee or rent
    #[error("Insufficient funds: {message} (endpoint: {endpoint})")]
    InsufficientFunds { endpoint: String, message: String },

    /// The node answered with something that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            LedgerError::Transport { endpoint, .. } => Some(endpoint),
            LedgerError::Timeout { endpoint, .. } => Some(endpoint),
            LedgerError::RpcResponse { endpoint, .. } => Some(endpoint),
            LedgerError::BlockhashNotFound { endpoint, .. } => Some(endpoint),
            LedgerError::InsufficientFunds { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        let code = match err.kind() {
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) => Some(*code),
            _ => None,
        };
        Self::classify(&err.to_string(), code, endpoint)
    }

    /// Classify a node error message; the message is always kept verbatim
    pub fn classify(message: &str, code: Option<i64>, endpoint: &str) -> Self {
        let lower = message.to_lowercase();
        let endpoint = endpoint.to_string();

        if lower.contains("blockhash not found") {
            LedgerError::BlockhashNotFound {
                endpoint,
                message: message.to_string(),
            }
        } else if lower.contains("insufficient funds")
            || lower.contains("insufficient lamports")
        {
            LedgerError::InsufficientFunds {
                endpoint,
                message: message.to_string(),
            }
        } else if lower.contains("timed out") || lower.contains("timeout") {
            LedgerError::Timeout {
                endpoint,
                message: message.to_string(),
            }
        } else if code.is_some() {
            LedgerError::RpcResponse {
                endpoint,
                message: message.to_string(),
                code,
            }
        } else if lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("error sending request")
        {
            LedgerError::Transport {
                endpoint,
                message: message.to_string(),
            }
        } else {
            LedgerError::RpcResponse {
                endpoint,
                message: message.to_string(),
                code: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_rpc_client_api::request::RpcResponseErrorData;

    const EP: &str = "https://api.devnet.solana.com";

    #[test]
    fn test_classify_blockhash_not_found() {
        let err = LedgerError::classify(
            "Transaction simulation failed: Blockhash not found",
            Some(-32002),
            EP,
        );
        assert!(matches!(err, LedgerError::BlockhashNotFound { .. }));
        assert_eq!(err.endpoint(), Some(EP));
    }

    #[test]
    fn test_classify_insufficient_funds() {
        let err = LedgerError::classify(
            "Attempt to debit an account but found no record of a prior credit. insufficient funds",
            Some(-32002),
            EP,
        );
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_classified_errors_keep_node_text() {
        let message = "Transaction simulation failed: Error processing Instruction 0: \
                       insufficient lamports 1000, need 1461600";
        let err = LedgerError::classify(message, Some(-32002), EP);
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(err.to_string().contains("need 1461600"));

        let err = LedgerError::classify("operation timed out after 30s", None, EP);
        assert!(matches!(err, LedgerError::Timeout { .. }));
        assert!(err.to_string().contains("operation timed out after 30s"));
        assert!(!err.to_string().contains("0ms"));
    }

    #[test]
    fn test_from_client_error_keeps_rpc_message() {
        let client_error = ClientError::from(ClientErrorKind::RpcError(
            RpcError::RpcResponseError {
                code: -32002,
                message: "Transaction simulation failed: Blockhash not found".to_string(),
                data: RpcResponseErrorData::Empty,
            },
        ));
        let err = LedgerError::from_client_error(client_error, EP);
        assert!(matches!(err, LedgerError::BlockhashNotFound { .. }));
        assert!(err
            .to_string()
            .contains("Transaction simulation failed: Blockhash not found"));
        assert_eq!(err.endpoint(), Some(EP));
    }

    #[test]
    fn test_classify_transport_and_response() {
        let err = LedgerError::classify("error sending request for url", None, EP);
        assert!(matches!(err, LedgerError::Transport { .. }));

        let err = LedgerError::classify("Invalid params", Some(-32602), EP);
        match err {
            LedgerError::RpcResponse { code, .. } => assert_eq!(code, Some(-32602)),
            other => panic!("Expected RpcResponse, got {:?}", other),
        }
    }
}
