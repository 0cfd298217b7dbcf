//! Gradle wrapper invocation.

pub mod invoker;
pub mod request;
pub mod runner;

pub use invoker::{BuildInvoker, InvocationSummary, StepKind, StepRecord};
pub use request::{BuildRequest, BuildTarget};
pub use runner::{
    CommandRunner, Invocation, ProcessOutcome, RecordingRunner, StdoutRoute, SystemRunner,
};
