use crate::domain::actor::Actor;
use crate::domain::ports::ActorProvider;
use crate::error::{FeeError, Result};

/// Serves a single actor fixed at start-up, or none.
#[derive(Debug, Default, Clone)]
pub struct StaticActorProvider {
    actor: Option<Actor>,
}

impl StaticActorProvider {
    pub fn new(actor: Option<Actor>) -> Self {
        Self { actor }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl ActorProvider for StaticActorProvider {
    fn current_actor(&self) -> Result<Actor> {
        self.actor.clone().ok_or(FeeError::Unauthenticated)
    }
}
