pub mod factory;
pub mod openai_compat;

pub use factory::create_provider;
pub use openai_compat::OpenAICompatProvider;
