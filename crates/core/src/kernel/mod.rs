//! Kernel selection and the per-run interpreter session

mod session;
mod spec;

pub use session::{CellReply, KernelSession, ReplyStatus};
pub use spec::KernelSpec;
