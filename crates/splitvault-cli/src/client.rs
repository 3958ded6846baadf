use color_eyre::{eyre::WrapErr, Result};
use splitvault_coordinator::client::CoordinatorClient;
use splitvault_crypto::SymmetricKey;

/// Store `payload` (words joined by spaces) and print the key needed to read it back.
pub async fn store(coordinator_url: &str, id: &str, payload: &[String]) -> Result<()> {
    let client = CoordinatorClient::new(coordinator_url);
    let key = client
        .store(id, &payload.join(" "))
        .await
        .wrap_err_with(|| format!("store {id} via {coordinator_url}"))?;
    println!("{}", key.to_base64());
    Ok(())
}

pub async fn retrieve(coordinator_url: &str, id: &str, key: &str) -> Result<()> {
    let key = SymmetricKey::from_base64(key).wrap_err("key is not a valid base64 AES-256 key")?;
    let client = CoordinatorClient::new(coordinator_url);
    let payload = client
        .retrieve(id, &key)
        .await
        .wrap_err_with(|| format!("retrieve {id} via {coordinator_url}"))?;
    println!("{payload}");
    Ok(())
}
