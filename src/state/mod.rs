//! State module for tracking scrape progress
//!
//! - `ArticleState`: the per-article state machine driven by the scheduler

mod article_state;

pub use article_state::ArticleState;
