//! The dynamic workflow Interpreter (spec §4.1) and its durable-context
//! façade (spec §1, §5).

pub mod durable;
pub mod engine;

pub use durable::{DurableContext, InProcessDurableContext, InstanceSnapshot, WhenAnyOutcome};
pub use engine::run;
