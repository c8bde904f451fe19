// Adapters layer: concrete implementations of the domain ports.

pub mod openai;
pub mod storage;
pub mod twitter;

pub use openai::OpenAiClassifier;
pub use storage::LocalStorage;
pub use twitter::TwitterSearchClient;
