use std::sync::Arc;

use crate::services::{Clock, CourseService, local_clock};
use crate::store::CourseStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self {
            store,
            clock: local_clock(),
        }
    }

    pub fn courses(&self) -> CourseService {
        CourseService::with_clock(self.store.clone(), self.clock.clone())
    }
}
