//! Generates a Dilithium keypair for node or issuer signing and prints it
//! as hex. Ephemeral — not persisted anywhere by this tool.

use covenant_crypto::signing::Signer;

fn main() {
    let signer = Signer::generate();
    println!("public_key = {}", hex::encode(&signer.public_key.0));
    println!("secret_key = {}", hex::encode(signer.secret_key_bytes()));
    eprintln!("store secret_key offline; anyone holding it can sign on this identity's behalf");
}
