mod hashed;
mod openai;

pub use hashed::HashedNgramEmbedding;
pub use openai::RemoteEmbedding;
