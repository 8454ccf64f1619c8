pub mod provider;
pub mod session;

pub use provider::{StaticWalletProvider, WalletError, WalletProvider};
pub use session::WalletSession;
