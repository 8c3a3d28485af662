// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod groq;

#[cfg(test)]
pub mod stub;

pub use provider::*;
