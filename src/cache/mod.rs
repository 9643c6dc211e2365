//! Token cache and quota gauge sink.

mod quota;
mod tokens;

pub use quota::{MetricsQuotaSink, NullQuotaSink, QuotaSink};
pub use tokens::TokenCache;
