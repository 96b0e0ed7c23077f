//! Injecting context values into a subtree.

use arbor_http::{ControllerResult, ParamSet, Request};
use tracing::debug;

use crate::Controller;

/// A controller that sets parameters in its subtree.
///
/// The parameter set is fixed at construction. On every dispatch it is
/// applied as one scope around the child, so injected values — service
/// handles, settings, fixed route parameters — are visible only below this
/// node and are removed again before control returns upward, even when the
/// subtree fails.
pub struct SetParams {
    controller: Box<dyn Controller>,
    params: ParamSet,
}

impl SetParams {
    pub fn new(controller: impl Controller + 'static, params: ParamSet) -> Self {
        Self {
            controller: Box::new(controller),
            params,
        }
    }
}

impl Controller for SetParams {
    fn handle(&self, request: &mut Request) -> ControllerResult {
        debug!(
            request = %request.id,
            params = ?self.params.keys().collect::<Vec<_>>(),
            "setting parameters"
        );
        let mut scope = request.scoped_set(self.params.clone());
        self.controller.handle(&mut scope)
    }

    fn children(&self) -> Vec<&dyn Controller> {
        vec![self.controller.as_ref()]
    }

    fn name(&self) -> &str {
        "SetParams"
    }
}
