// generate_key.rs
// Utility to generate a new encryption master key for the system

#[path = "services/encryption.rs"]
mod encryption;

use encryption::EncryptionService;

fn main() {
    println!("Generating new AES-256 encryption key...\n");

    let key = EncryptionService::generate_key();

    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("ENCRYPTION_MASTER_KEY={}", key);
    println!("─────────────────────────────────────────────────");
    println!("\nIMPORTANT:");
    println!("  • Keep this key secure and never commit it to version control");
    println!("  • If you lose this key, stored provider keys cannot be recovered");
}
