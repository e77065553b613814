//! Model invocation: credential rotation, retry policy, and prompt assembly

pub mod credentials;
pub mod prompt;
pub mod resilient;

pub use credentials::{Credential, CredentialPool};
pub use prompt::PromptBuilder;
pub use resilient::{ResilientLlm, RetryPolicy};
