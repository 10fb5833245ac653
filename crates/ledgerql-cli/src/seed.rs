//! Demo banking dataset.
//!
//! Three related tables: account holders, their accounts, and transfers
//! between accounts. Relationships are conventions held by the data —
//! `accounts.account_holder` references a holder id and transactions
//! reference IBAN strings — the engine enforces none of them.

use anyhow::Result;

use ledgerql::Database;

const ACCOUNT_HOLDERS: &str = r#"{
    "1": {"id": 1, "first_name": "Aria", "last_name": "Chen", "birthplace": "Roma",
          "address": "123 Maple St, Rome", "email": "a.chen@mail.it"},
    "2": {"id": 2, "first_name": "Ben", "last_name": "Davis", "birthplace": "Milano",
          "address": "45 Oak Ave, Milan", "email": "b.davis@mail.it"},
    "3": {"id": 3, "first_name": "Chris", "last_name": "Evans", "birthplace": "Napoli",
          "address": "789 Pine Ln, Naples", "email": "c.evans@mail.it"},
    "4": {"id": 4, "first_name": "Mia", "last_name": "Lee", "birthplace": "Torino",
          "address": "101 Cedar Dr, Turin", "email": "m.lee@mail.it"}
}"#;

const ACCOUNTS: &str = r#"{
    "1001": {"id": 1001, "iban": "IT60A123456789000000000001", "account_number": "000000100100",
             "branch": "CAB11", "account_holder": 1, "balance": 500.5, "status": "active"},
    "1002": {"id": 1002, "iban": "IT60B123456789000000000002", "account_number": "000000100200",
             "branch": "CAB11", "account_holder": 1, "balance": 12000.0, "status": "active"},
    "1003": {"id": 1003, "iban": "IT60C123456789000000000003", "account_number": "000000100300",
             "branch": "CAB12", "account_holder": 2, "balance": 150.25, "status": "active"},
    "1004": {"id": 1004, "iban": "IT60D123456789000000000004", "account_number": "000000100400",
             "branch": "CAB12", "account_holder": 3, "balance": 5500.75, "status": "active"},
    "1005": {"id": 1005, "iban": "IT60E123456789000000000005", "account_number": "000000100500",
             "branch": "CAB11", "account_holder": 4, "balance": 30.0, "status": "suspended"},
    "1006": {"id": 1006, "iban": "IT60F123456789000000000006", "account_number": "000000100600",
             "branch": "CAB13", "account_holder": 4, "balance": 2500.0, "status": "active"}
}"#;

const TRANSACTIONS: &str = r#"{
    "1": {"id": 1, "remitter_iban": "IT60B123456789000000000002",
          "beneficiary_iban": "IT60C123456789000000000003", "amount": 500.0,
          "transaction_date": "2025-10-22T09:30:00Z", "status": "fulfilled"},
    "2": {"id": 2, "remitter_iban": "IT60A123456789000000000001",
          "beneficiary_iban": "EXTERNAL_VENDOR_IBAN_A", "amount": 50.99,
          "transaction_date": "2025-10-22T10:15:00Z", "status": "fulfilled"},
    "3": {"id": 3, "remitter_iban": "EXTERNAL_PAYCHECK_IBAN",
          "beneficiary_iban": "IT60D123456789000000000004", "amount": 1500.0,
          "transaction_date": "2025-10-22T11:45:00Z", "status": "fulfilled"},
    "4": {"id": 4, "remitter_iban": "IT60F123456789000000000006",
          "beneficiary_iban": "EXTERNAL_BILL_COMPANY", "amount": 250.0,
          "transaction_date": "2025-10-22T14:00:00Z", "status": "fulfilled"},
    "5": {"id": 5, "remitter_iban": "IT60D123456789000000000004",
          "beneficiary_iban": "IT60B123456789000000000002", "amount": 25.0,
          "transaction_date": "2025-10-23T08:00:00Z", "status": "fulfilled"},
    "6": {"id": 6, "remitter_iban": "EXTERNAL_LARGE_DEPOSIT",
          "beneficiary_iban": "IT60B123456789000000000002", "amount": 5000.0,
          "transaction_date": "2025-10-23T10:00:00Z", "status": "pending"}
}"#;

/// Seeds the demo tables. Tables that already contain rows are left
/// untouched.
pub fn apply(db: &mut Database) -> Result<()> {
    for (table, payload) in [
        ("account_holders", ACCOUNT_HOLDERS),
        ("accounts", ACCOUNTS),
        ("transactions", TRANSACTIONS),
    ] {
        if db.seed_table(table, payload)? {
            println!("seeded {table}");
        } else {
            println!("{table} already has rows, skipped");
        }
    }
    Ok(())
}
