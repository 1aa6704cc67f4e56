// Retrieval-augmented generation
//
// Components:
// - Prompt: fixed QA template and question augmentation
// - Context: "stuff" passages into one block
// - Retrieval: embed the query, nearest-neighbour search
// - Chain: retrieve -> stuff -> render -> generate
// - Pipeline: long-lived handles built once at startup

pub mod chain;
pub mod context;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;

pub use chain::{ChainOutput, RetrievalQa};
pub use context::stuff_passages;
pub use pipeline::MedicalPipeline;
pub use prompt::{augment_question, PromptTemplate, QA_TEMPLATE};
pub use retrieval::Retriever;
