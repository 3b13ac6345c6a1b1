//! Navigation port used by the redirector.

use parking_lot::Mutex;

use crate::redirect::Route;

pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;

    /// Replace the current screen without growing history.
    fn replace(&self, route: Route);
}

/// Navigator that keeps the current route and every replace it received.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<Route>,
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: Mutex::new(initial),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the user moving somewhere on their own.
    pub fn visit(&self, route: Route) {
        *self.current.lock() = route;
    }

    /// Every route passed to [`Navigator::replace`], oldest first.
    pub fn replacements(&self) -> Vec<Route> {
        self.history.lock().clone()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> Route {
        self.current.lock().clone()
    }

    fn replace(&self, route: Route) {
        *self.current.lock() = route.clone();
        self.history.lock().push(route);
    }
}
