use std::fmt;
use std::sync::Arc;

use sea_orm::{EntityTrait, Select};

type ScopeFn<E> = dyn Fn(Select<E>) -> Select<E> + Send + Sync;

/// A named query transformation.
pub struct NamedScope<E: EntityTrait> {
    name: String,
    apply: Arc<ScopeFn<E>>,
}

impl<E: EntityTrait> NamedScope<E> {
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(Select<E>) -> Select<E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, select: Select<E>) -> Select<E> {
        (self.apply)(select)
    }
}

impl<E: EntityTrait> Clone for NamedScope<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for NamedScope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedScope").field("name", &self.name).finish()
    }
}
