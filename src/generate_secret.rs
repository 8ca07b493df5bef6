// generate_secret.rs
// Utility to generate a JWT signing secret for JWT_SECRET_KEY

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};

// HS512 wants at least 64 bytes of key material
const SECRET_BYTES: usize = 64;

fn main() {
    println!("Generating new HS512 signing secret...\n");

    let mut key = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut key);
    let secret = BASE64.encode(key);

    println!("✅ Secret generated successfully!\n");
    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("JWT_SECRET_KEY={}", secret);
    println!("─────────────────────────────────────────────────");
    println!("\n⚠️  IMPORTANT:");
    println!("  • Keep this secret out of version control");
    println!("  • Rotating it invalidates every token already issued");
}
