use sea_orm::{EntityTrait, Select};

use super::config::ResolvedRelation;

/// The query under construction plus the relations queued for loading once
/// rows are fetched. Each pipeline stage takes it by value and hands it on.
#[derive(Debug, Clone)]
pub struct QueryState<E: EntityTrait> {
    pub select: Select<E>,
    pub with: Vec<ResolvedRelation<E::Column>>,
    pub with_count: Vec<ResolvedRelation<E::Column>>,
}

impl<E: EntityTrait> QueryState<E> {
    pub fn new(select: Select<E>) -> Self {
        Self {
            select,
            with: Vec::new(),
            with_count: Vec::new(),
        }
    }

    pub fn map(self, f: impl FnOnce(Select<E>) -> Select<E>) -> Self {
        Self {
            select: f(self.select),
            ..self
        }
    }
}
