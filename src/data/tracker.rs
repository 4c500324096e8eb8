use std::time::Duration;

use alloy::primitives::B256;
use tracing::{debug, warn};

use crate::data::gateway::{ContractGateway, ReceiptStatus};
use crate::error::GatewayError;

/// Poll for a receipt until it reports success, revert, an RPC error, or the
/// timeout elapses. Poll errors are terminal; nothing is retried.
pub async fn wait_for_receipt(
    gateway: &dyn ContractGateway,
    hash: B256,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), GatewayError> {
    let poll = async {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            match gateway.receipt(hash).await? {
                ReceiptStatus::NotFound => debug!(%hash, "receipt not yet available"),
                ReceiptStatus::Success => return Ok(()),
                ReceiptStatus::Reverted => return Err(GatewayError::ReceiptFailure { hash }),
            }
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%hash, ?timeout, "gave up waiting for receipt");
            Err(GatewayError::Timeout { hash })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gateway::mock::MockGateway;

    const FAST: Duration = Duration::from_millis(1);
    const LONG: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_success_after_pending_polls() {
        let gateway = MockGateway::new();
        gateway.push_receipt(Ok(ReceiptStatus::NotFound));
        gateway.push_receipt(Ok(ReceiptStatus::NotFound));
        gateway.push_receipt(Ok(ReceiptStatus::Success));

        let result = wait_for_receipt(&gateway, B256::ZERO, FAST, LONG).await;
        assert_eq!(result, Ok(()));
        assert!(gateway.receipts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_is_receipt_failure() {
        let gateway = MockGateway::new();
        gateway.push_receipt(Ok(ReceiptStatus::Reverted));

        let hash = B256::repeat_byte(0x05);
        let result = wait_for_receipt(&gateway, hash, FAST, LONG).await;
        assert_eq!(result, Err(GatewayError::ReceiptFailure { hash }));
    }

    #[tokio::test]
    async fn test_poll_error_is_terminal() {
        let gateway = MockGateway::new();
        gateway.push_receipt(Err(GatewayError::Read("connection reset".into())));
        gateway.push_receipt(Ok(ReceiptStatus::Success));

        let result = wait_for_receipt(&gateway, B256::ZERO, FAST, LONG).await;
        assert!(matches!(result, Err(GatewayError::Read(_))));
    }

    #[tokio::test]
    async fn test_times_out_when_never_mined() {
        let gateway = MockGateway::new();
        let hash = B256::repeat_byte(0x06);
        let result =
            wait_for_receipt(&gateway, hash, FAST, Duration::from_millis(20)).await;
        assert_eq!(result, Err(GatewayError::Timeout { hash }));
    }
}
