//! ATM ledger walkthrough

use std::str::FromStr;

use atm_ledger::utils::MemoryStorage;
use atm_ledger::{Ledger, LedgerError};
use bigdecimal::BigDecimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏧 ATM Ledger - Walkthrough\n");

    let ledger = Ledger::new(MemoryStorage::new());

    // 1. Open two accounts
    println!("👤 Opening accounts...");
    let alice = ledger.create_account("Alice", "1111").await?;
    let bob = ledger.create_account("Bob", "2222").await?;
    println!("  ✓ {} - {}", alice.id, alice.name);
    println!("  ✓ {} - {}", bob.id, bob.name);
    println!();

    // 2. Move some money
    println!("💰 Moving money...");
    let receipt = ledger
        .deposit(&alice.id, "1111", &BigDecimal::from(500))
        .await?;
    println!("  ✓ Alice deposited ₹500, balance ₹{}", receipt.balance);

    let receipt = ledger
        .withdraw(&alice.id, "1111", &BigDecimal::from_str("120.50")?)
        .await?;
    println!("  ✓ Alice withdrew ₹120.50, balance ₹{}", receipt.balance);

    let transfer = ledger
        .transfer(&alice.id, "1111", &bob.id, &BigDecimal::from(200))
        .await?;
    println!(
        "  ✓ Alice sent ₹{} to Bob (ref {}), balance ₹{}",
        transfer.amount, transfer.reference, transfer.balance
    );
    println!();

    // 3. Things the ATM refuses
    println!("🚫 Refused operations...");
    match ledger
        .withdraw(&bob.id, "2222", &BigDecimal::from(1_000))
        .await
    {
        Err(LedgerError::InsufficientFunds) => println!("  ✓ Bob cannot overdraw"),
        other => println!("  ✗ unexpected: {:?}", other),
    }
    match ledger.deposit(&bob.id, "9999", &BigDecimal::from(1)).await {
        Err(err) => println!("  ✓ Wrong PIN: {}", err),
        Ok(_) => println!("  ✗ deposit with a wrong PIN went through"),
    }
    println!();

    // 4. Change a PIN
    ledger.change_pin(&bob.id, "2222", "3333").await?;
    println!("🔑 Bob's PIN changed\n");

    // 5. Statements
    for (account, pin) in [(&alice, "1111"), (&bob, "3333")] {
        println!("📄 Statement for {} ({})", account.name, account.id);
        for record in ledger.statement(&account.id, pin).await? {
            println!(
                "  {:<12} {:>10} from {:<6} to {}",
                record.kind.to_string(),
                record.amount,
                record.from.as_deref().unwrap_or("-"),
                record.to
            );
        }
        println!();
    }

    Ok(())
}
