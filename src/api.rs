//! HTTP API for the portfolio chat widget

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::portfolio::Portfolio;
use crate::runtime::RuntimeManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeManager>,
    pub portfolio: Arc<Portfolio>,
}

impl AppState {
    pub fn new(runtime: Arc<RuntimeManager>, portfolio: Arc<Portfolio>) -> Self {
        Self { runtime, portfolio }
    }
}
