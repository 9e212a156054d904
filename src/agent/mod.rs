pub mod context;
pub mod loop_;
pub mod system_prompt;
pub mod transcript;

pub use context::Conversation;
pub use loop_::{run_task, RunReport, LOOP_LIMIT_MESSAGE};
pub use transcript::Transcript;
