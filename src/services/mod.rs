pub mod assessment;
pub mod catalog;
pub mod generation;
pub mod materializer;
pub mod prompts;
