//! CSV format handling for seed accounts, transfer requests and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - `AccountCsvRecord` / `TransferCsvRecord` structures for deserialization
//! - Conversion from CSV records to domain types
//! - Account and transaction report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::commission::parse_amount;
use crate::types::{Account, AccountId, NewAccount, Transaction, TransferRequest};
use chrono::SecondsFormat;
use serde::Deserialize;
use std::io::Write;

/// Seed account row: `id,name,email,balance`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub balance: String,
}

/// Transfer request row: `sender,receiver,amount`
///
/// The amount is kept as text so a bad value can be reported with its row
/// instead of failing the whole deserialization.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: Option<String>,
}

/// Convert an AccountCsvRecord to a NewAccount
///
/// Only the balance is parsed here; sign and precision are enforced when the
/// account is opened.
pub fn convert_account_record(record: AccountCsvRecord) -> Result<NewAccount, String> {
    let balance = parse_amount(&record.balance)
        .map_err(|e| format!("{} for account {}", e, record.id))?;

    Ok(NewAccount {
        id: record.id,
        name: record.name,
        email: record.email,
        balance,
    })
}

/// Convert a TransferCsvRecord to a TransferRequest
///
/// # Returns
///
/// Result containing either:
/// - Ok(TransferRequest) - Successfully converted record
/// - Err(String) - Missing or unparseable amount
pub fn convert_transfer_record(record: TransferCsvRecord) -> Result<TransferRequest, String> {
    let amount = match record.amount {
        Some(raw) if !raw.trim().is_empty() => parse_amount(&raw).map_err(|e| {
            format!(
                "{} for transfer {} -> {}",
                e, record.sender, record.receiver
            )
        })?,
        _ => {
            return Err(format!(
                "Transfer {} -> {} requires an amount",
                record.sender, record.receiver
            ))
        }
    };

    Ok(TransferRequest {
        sender: record.sender,
        receiver: record.receiver,
        amount,
    })
}

/// Write account balances to CSV format
///
/// Writes accounts with columns: id, name, email, balance.
/// Accounts are sorted by id for deterministic output; balances always carry
/// two fractional digits.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "name", "email", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(Account::id);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id().to_string(),
                account.holder.name,
                account.holder.email,
                format!("{:.2}", account.balance),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write the transaction log to CSV format
///
/// Columns: id, sender_id, receiver_id, amount, commission_fee, status,
/// created_at (RFC 3339, millisecond precision, UTC).
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "id",
            "sender_id",
            "receiver_id",
            "amount",
            "commission_fee",
            "status",
            "created_at",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for transaction in transactions {
        writer
            .write_record(&[
                transaction.id.to_string(),
                transaction.sender_id.to_string(),
                transaction.receiver_id.to_string(),
                format!("{:.2}", transaction.amount),
                format!("{:.2}", transaction.commission_fee),
                transaction.status.to_string(),
                transaction
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ])
            .map_err(|e| format!("Failed to write transaction record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountHolder, TransactionStatus};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn account(id: AccountId, name: &str, balance: Decimal) -> Account {
        Account {
            holder: AccountHolder {
                id,
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            },
            balance,
        }
    }

    fn transfer_record(amount: Option<&str>) -> TransferCsvRecord {
        TransferCsvRecord {
            sender: 1,
            receiver: 2,
            amount: amount.map(|s| s.to_string()),
        }
    }

    #[rstest]
    #[case::plain("100.00", Decimal::new(10000, 2))]
    #[case::integer("100", Decimal::new(100, 0))]
    #[case::whitespace("  7.5  ", Decimal::new(75, 1))]
    fn test_convert_transfer_record_valid(#[case] amount: &str, #[case] expected: Decimal) {
        let request = convert_transfer_record(transfer_record(Some(amount))).unwrap();

        assert_eq!(request.sender, 1);
        assert_eq!(request.receiver, 2);
        assert_eq!(request.amount, expected);
    }

    #[rstest]
    #[case::missing(None, "requires an amount")]
    #[case::empty(Some(""), "requires an amount")]
    #[case::whitespace(Some("  "), "requires an amount")]
    #[case::not_a_number(Some("ten"), "Invalid amount 'ten'")]
    fn test_convert_transfer_record_errors(
        #[case] amount: Option<&str>,
        #[case] expected_error: &str,
    ) {
        let error = convert_transfer_record(transfer_record(amount)).unwrap_err();
        assert!(error.contains(expected_error), "{}", error);
    }

    #[test]
    fn test_convert_transfer_record_keeps_sign_for_the_engine() {
        let request = convert_transfer_record(transfer_record(Some("-5"))).unwrap();
        assert_eq!(request.amount, Decimal::new(-5, 0));
    }

    #[rstest]
    #[case::valid("1000.00", Ok(Decimal::new(100000, 2)))]
    #[case::invalid("lots", Err("Invalid amount 'lots' for account 1".to_string()))]
    fn test_convert_account_record(
        #[case] balance: &str,
        #[case] expected: Result<Decimal, String>,
    ) {
        let record = AccountCsvRecord {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            balance: balance.to_string(),
        };

        let result = convert_account_record(record).map(|account| account.balance);
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case::single_account(
        vec![account(1, "Alice", Decimal::new(89850, 2))],
        "id,name,email,balance\n1,Alice,alice@example.com,898.50\n"
    )]
    #[case::sorted_by_id(
        vec![
            account(3, "Carol", Decimal::ZERO),
            account(1, "Alice", Decimal::ZERO),
            account(2, "Bob", Decimal::ZERO),
        ],
        "id,name,email,balance\n1,Alice,alice@example.com,0.00\n2,Bob,bob@example.com,0.00\n3,Carol,carol@example.com,0.00\n"
    )]
    #[case::pads_to_two_decimals(
        vec![account(1, "Alice", Decimal::new(5, 0))],
        "id,name,email,balance\n1,Alice,alice@example.com,5.00\n"
    )]
    #[case::quotes_names_with_commas(
        vec![account(1, "Doe, Jane", Decimal::ONE)],
        "id,name,email,balance\n1,\"Doe, Jane\",\"doe, jane@example.com\",1.00\n"
    )]
    #[case::empty_accounts(vec![], "id,name,email,balance\n")]
    fn test_write_accounts_csv(#[case] accounts: Vec<Account>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        write_accounts_csv(&accounts, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_transactions_csv() {
        let transactions = vec![Transaction {
            id: 1,
            sender_id: 1,
            receiver_id: 2,
            amount: Decimal::new(100, 0),
            commission_fee: Decimal::new(150, 2),
            status: TransactionStatus::Completed,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }];

        let mut output = Vec::new();
        write_transactions_csv(&transactions, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,sender_id,receiver_id,amount,commission_fee,status,created_at\n\
             1,1,2,100.00,1.50,completed,2026-01-02T03:04:05.000Z\n"
        );
    }
}
