//! Identity keys and FROM-clause subjects.

use crate::column::Projection;
use crate::derived::DerivedTable;
use crate::dialect::RenderContext;
use crate::meta::Table;
use crate::render::Render;
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SELECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a selection (table definition, aliased table usage or
/// derived table), assigned once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionId(u64);

impl SelectionId {
    pub(crate) fn next() -> Self {
        SelectionId(NEXT_SELECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity of a projection: the selection it reads from plus the column's
/// position in that selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    pub selection: SelectionId,
    pub ordinal: usize,
}

/// A FROM-clause subject.
#[derive(Debug, Clone)]
pub enum Selection {
    Table(Table),
    Derived(DerivedTable),
}

impl Selection {
    /// Identity used for deduplication.
    pub fn id(&self) -> SelectionId {
        match self {
            Selection::Table(t) => t.id(),
            Selection::Derived(d) => d.id(),
        }
    }

    /// Every projection this selection exposes, in definition order.
    pub fn projections(&self) -> Vec<Projection> {
        match self {
            Selection::Table(t) => t.columns().into_iter().map(Projection::Column).collect(),
            Selection::Derived(d) => d.columns().into_iter().map(Projection::Derived).collect(),
        }
    }

    /// Alias of the selection, if any.
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Selection::Table(t) => t.alias_name(),
            Selection::Derived(d) => Some(d.alias_name()),
        }
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Selection {}

impl Render for Selection {
    fn size(&self, ctx: &RenderContext) -> usize {
        match self {
            Selection::Table(t) => t.size(ctx),
            Selection::Derived(d) => d.size(ctx),
        }
    }

    fn arg_count(&self) -> usize {
        match self {
            Selection::Table(t) => t.arg_count(),
            Selection::Derived(d) => d.arg_count(),
        }
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        match self {
            Selection::Table(t) => t.scan(ctx, buf, args, cur_arg),
            Selection::Derived(d) => d.scan(ctx, buf, args, cur_arg),
        }
    }
}

impl From<Table> for Selection {
    fn from(t: Table) -> Self {
        Selection::Table(t)
    }
}

impl From<&Table> for Selection {
    fn from(t: &Table) -> Self {
        Selection::Table(t.clone())
    }
}

impl From<crate::meta::TableDef> for Selection {
    fn from(def: crate::meta::TableDef) -> Self {
        Selection::Table(def.table())
    }
}

impl From<&crate::meta::TableDef> for Selection {
    fn from(def: &crate::meta::TableDef) -> Self {
        Selection::Table(def.table())
    }
}

impl From<DerivedTable> for Selection {
    fn from(d: DerivedTable) -> Self {
        Selection::Derived(d)
    }
}

impl From<&DerivedTable> for Selection {
    fn from(d: &DerivedTable) -> Self {
        Selection::Derived(d.clone())
    }
}
