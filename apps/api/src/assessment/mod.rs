pub mod badge;
pub mod handlers;
pub mod models;
pub mod question_bank;
pub mod recommendations;
pub mod results;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod store;
