pub mod error;
pub mod limiters;
pub mod tokenizer;

pub use error::ChatbotError;
pub use limiters::RateLimiter;
pub use tokenizer::tokenize;
