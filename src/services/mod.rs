pub mod gateway;
pub mod llm_service;
pub mod prompt_store;

pub use gateway::{GenerateRequest, GenerateResponse, GenerationKind, LlmGateway, PromptDefaults};
pub use llm_service::LlmService;
pub use prompt_store::PromptStore;
