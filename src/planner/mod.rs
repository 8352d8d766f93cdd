//! The Planner Workflow (spec §4.4): a fixed four-phase durable workflow
//! (plan -> persist -> await approval -> execute) callable directly via
//! the planner HTTP API or as a child of the dynamic interpreter's agent
//! nodes.

pub mod workflow;

pub use workflow::{run, PlannerOutput};
