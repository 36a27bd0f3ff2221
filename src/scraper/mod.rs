pub mod fetcher;
pub mod rate_limiter;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use fetcher::{Fetcher, ReqwestTransport};
pub use traits::HttpTransport;
