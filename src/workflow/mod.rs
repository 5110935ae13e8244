pub mod policy;
pub mod step_ctx;
pub mod unlock_flow;

pub use policy::{StepPolicy, Timeouts};
pub use step_ctx::StepCtx;
pub use unlock_flow::{SettleDelays, UnlockFlow};
