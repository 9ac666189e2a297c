use async_trait::async_trait;

/// Result of an account lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFetch {
    /// Base64 account data
    Found(String),
    /// The node answered and the account does not exist
    Closed,
    /// No answer after retries
    Unavailable,
}

/// Chain RPC port trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainPort: Send + Sync {
    /// Fetch raw account data at `address`.
    async fn fetch_account(&self, address: &str) -> AccountFetch;
}
