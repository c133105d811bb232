//! Crypto Adapters - 凭据加密

mod key_vault;

pub use key_vault::AesKeyVault;
