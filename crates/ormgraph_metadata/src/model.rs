//! The frozen runtime model.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use arc_swap::ArcSwap;
use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{Error, HostType, Result};
use tracing::trace;

use crate::entity_type::EntityTypeRef;
use crate::graph::ModelGraph;
use crate::ids::EntityTypeId;
use crate::mapping::ModelDependencies;

type AdHocMap = im::HashMap<HostType, AdHocEntityType>;

/// An immutable model, safe to share across threads.
///
/// Produced by [`ModelBuilder::finalize`](crate::ModelBuilder::finalize).
/// Primary-tier state never changes; runtime annotations and the ad-hoc
/// registry publish lock-free.
pub struct Model {
    graph: ModelGraph,
    ad_hoc: ArcSwap<AdHocMap>,
}

impl Model {
    pub(crate) fn from_graph(graph: ModelGraph) -> Self {
        Self {
            graph,
            ad_hoc: ArcSwap::from_pointee(AdHocMap::new()),
        }
    }

    /// Returns the model; finalization already happened in the builder.
    #[must_use]
    pub fn finalize_model(&self) -> &Self {
        self
    }

    /// Attaches the runtime services used to resolve type mappings.
    ///
    /// The first registration wins; later calls return the services already
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime slot holds a value of another type.
    pub fn set_model_dependencies(
        &self,
        dependencies: ModelDependencies,
    ) -> Result<Arc<ModelDependencies>> {
        self.graph
            .runtime
            .get_or_add_value(names::MODEL_DEPENDENCIES, || dependencies)
    }

    // =========================================================================
    // Ad-hoc entity types
    // =========================================================================

    /// Registers an entity type synthesized on demand for `host_type`.
    ///
    /// Concurrent registrations for the same host type race; every caller
    /// receives the registration that was published first.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if `entity_type` does not exist in `model`.
    pub fn add_ad_hoc_entity_type(
        &self,
        host_type: HostType,
        model: Arc<Model>,
        entity_type: EntityTypeId,
    ) -> Result<AdHocEntityType> {
        if model.entity_type(entity_type).is_none() {
            return Err(Error::node_not_found(format!("{entity_type:?}")));
        }
        let candidate = AdHocEntityType { model, entity_type };
        loop {
            let current = self.ad_hoc.load_full();
            if let Some(existing) = current.get(&host_type) {
                trace!(host_type = %host_type, "ad-hoc entity type race lost, adopting winner");
                return Ok(existing.clone());
            }
            let next = Arc::new(current.update(host_type.clone(), candidate.clone()));
            let previous = self.ad_hoc.compare_and_swap(&current, next);
            if Arc::ptr_eq(&previous, &current) {
                return Ok(candidate);
            }
        }
    }

    /// Finds the ad-hoc entity type registered for `host_type`.
    #[must_use]
    pub fn find_ad_hoc_entity_type(&self, host_type: &HostType) -> Option<AdHocEntityType> {
        self.ad_hoc.load().get(host_type).cloned()
    }

    /// Returns the number of ad-hoc registrations.
    #[must_use]
    pub fn ad_hoc_entity_type_count(&self) -> usize {
        self.ad_hoc.load().len()
    }
}

impl Deref for Model {
    type Target = ModelGraph;

    fn deref(&self) -> &ModelGraph {
        &self.graph
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("graph", &self.graph)
            .field("ad_hoc", &self.ad_hoc_entity_type_count())
            .finish()
    }
}

/// An entity type registered in a model's ad-hoc registry.
///
/// The entity type lives in its own (usually single-type) model, which the
/// registration keeps alive.
#[derive(Clone)]
pub struct AdHocEntityType {
    model: Arc<Model>,
    entity_type: EntityTypeId,
}

impl AdHocEntityType {
    /// Returns the model holding the entity type.
    #[must_use]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Returns the entity type id within [`AdHocEntityType::model`].
    #[must_use]
    pub fn entity_type_id(&self) -> EntityTypeId {
        self.entity_type
    }

    /// Returns the entity type.
    #[must_use]
    pub fn entity_type(&self) -> EntityTypeRef<'_> {
        EntityTypeRef::new(&self.model, self.entity_type)
    }
}

impl PartialEq for AdHocEntityType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model) && self.entity_type == other.entity_type
    }
}

impl Eq for AdHocEntityType {}

impl fmt::Debug for AdHocEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdHocEntityType({:?})", self.entity_type())
    }
}
