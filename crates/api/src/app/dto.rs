use serde_json::json;

use ledgerbank_infra::{Receipt, TransferReceipt};
use ledgerbank_ledger::TransactionRecord;

// Request bodies deserialize directly into the validator's raw payload types
// (`RawMovement`, `RawTransfer`), so field-level validation happens in one
// place in the domain crate rather than in serde attributes here.

pub fn receipt_to_json(receipt: Receipt) -> serde_json::Value {
    json!({
        "balance": receipt.balance.minor_units(),
        "transaction_id": receipt.transaction_id.to_string(),
    })
}

pub fn transfer_receipt_to_json(receipt: TransferReceipt) -> serde_json::Value {
    json!({
        "balance": receipt.balance.minor_units(),
        "transfer_id": receipt.transfer_id.to_string(),
    })
}

pub fn transaction_to_json(record: &TransactionRecord) -> serde_json::Value {
    json!({
        "transaction_id": record.id.to_string(),
        "account_number": record.account_number.as_str(),
        "kind": record.kind.as_str(),
        "signed_amount": record.signed_amount.minor_units(),
        "transfer_id": record.transfer_id.map(|t| t.to_string()),
        "occurred_at": record.occurred_at.to_rfc3339(),
        "status": match record.status {
            ledgerbank_ledger::TransactionStatus::Completed => "completed",
            ledgerbank_ledger::TransactionStatus::Failed => "failed",
        },
    })
}
