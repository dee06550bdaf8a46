/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Bear's Task Factory adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    Credentials,
    FactoryClient,
    FactoryError,
    Result,
    TASKS_PER_LABEL,
    parse_generated_tasks,
    task_prompt,
};
pub use http::client::{DEFAULT_MODEL, GENERATION_BASE_URL};

// Re-export all types
pub use types::*;
