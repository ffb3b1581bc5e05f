//! One collection's optimistic state for the lifetime of a page.

use std::collections::HashSet;
use std::sync::Arc;

use nasara_async_utils::bounded;
use nasara_backend_client::FetchError;
use nasara_backend_client::PersistenceEndpoint;
use nasara_mutation::MutationController;
use nasara_mutation::PersistFailure;
use nasara_protocol::ItemId;
use nasara_protocol::ReviewGateState;
use nasara_protocol::TrackedStatus;
use nasara_protocol::derive_section_review_state;
use nasara_protocol::status::parse_status_map;
use nasara_readiness::Readiness;
use nasara_readiness::compute_completion_within;
use nasara_readiness::compute_grouped_completion;
use tracing::info;
use tracing::warn;

use crate::config::SessionConfig;

/// Optimistic view over one tracked collection.
///
/// The server copy is the source of truth on success; this in-memory copy
/// reconciles through rollback on failure. One session owns its state
/// exclusively; nothing is shared across sessions.
pub struct CollectionSession<S> {
    controller: MutationController<ItemId, S>,
    endpoint: Arc<dyn PersistenceEndpoint>,
    parent_id: String,
    config: SessionConfig,
}

impl<S> CollectionSession<S>
where
    S: TrackedStatus + Send + Sync + 'static,
{
    /// Seed a session from the endpoint.
    ///
    /// A malformed collection response degrades to an empty seed — the
    /// page renders with every item at its default status. A transport
    /// failure is returned to the caller; there is nothing to render.
    pub async fn load(
        endpoint: Arc<dyn PersistenceEndpoint>,
        parent_id: impl Into<String>,
        config: SessionConfig,
    ) -> Result<Self, FetchError> {
        let parent_id = parent_id.into();
        let raw = match endpoint.fetch_collection(S::KIND, &parent_id).await {
            Ok(raw) => raw,
            Err(FetchError::MalformedResponse { reason }) => {
                warn!(kind = %S::KIND, reason, "malformed collection response, starting empty");
                Default::default()
            }
            Err(err) => return Err(err),
        };
        info!(kind = %S::KIND, parent = %parent_id, items = raw.len(), "seeded collection session");

        let controller = MutationController::new();
        controller.seed(parse_status_map(&raw));
        Ok(Self {
            controller,
            endpoint,
            parent_id,
            config,
        })
    }

    /// The collection this session was seeded for.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Current optimistic status of an item; unset items read as default.
    pub fn status(&self, id: &ItemId) -> S {
        self.controller.display_value(id)
    }

    /// Optimistically set an item's status and persist in the background.
    pub fn set_status(&self, id: ItemId, status: S) {
        let endpoint = Arc::clone(&self.endpoint);
        let timeout = self.config.persist_timeout();
        self.controller.begin_mutation(id, status, move |key: ItemId, value: S| async move {
            let wire = value.as_wire();
            let call = endpoint.persist(S::KIND, key.as_str(), &wire);
            match bounded(call, timeout).await {
                Ok(result) => result,
                Err(_) => Err(PersistFailure::Timeout),
            }
        });
    }

    /// Completion over the page's item universe. Stale map keys outside
    /// the universe are excluded on both sides of the fraction.
    pub fn readiness(&self, universe: &[ItemId]) -> Readiness {
        let snapshot = self.controller.values_snapshot();
        let allowed: HashSet<ItemId> = universe.iter().cloned().collect();
        compute_completion_within(&snapshot, &allowed, &S::complete_statuses())
    }

    /// Per-group completion for category cards and timeline phases.
    pub fn grouped_readiness<'a, I, G>(
        &self,
        items: &'a [I],
        group_key: impl Fn(&'a I) -> G,
        item_id: impl Fn(&'a I) -> &'a ItemId,
    ) -> Vec<(G, Readiness)>
    where
        G: PartialEq,
    {
        let snapshot = self.controller.values_snapshot();
        compute_grouped_completion(items, &snapshot, group_key, item_id, &S::complete_statuses())
    }

    pub fn is_saving(&self, id: &ItemId) -> bool {
        self.controller.is_saving(id)
    }

    pub fn is_saving_any(&self) -> bool {
        self.controller.is_saving_any()
    }

    pub fn failure(&self, id: &ItemId) -> Option<PersistFailure> {
        self.controller.failure(id)
    }

    pub fn dismiss_failure(&self, id: &ItemId) {
        self.controller.dismiss_failure(id)
    }

    /// Cancel all in-flight persistence and pending timers. Call on page
    /// teardown; late settlements become no-ops.
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}

impl CollectionSession<String> {
    /// Debounced narrative editing: the displayed text follows every call
    /// immediately, persistence fires once per quiet window.
    pub fn edit_text(&self, id: ItemId, text: String) {
        let endpoint = Arc::clone(&self.endpoint);
        let timeout = self.config.persist_timeout();
        let quiet = self.config.narrative_quiet();
        self.controller.schedule_mutation(
            id,
            text,
            move |key: ItemId, value: String| async move {
                let call = endpoint.persist(<String as TrackedStatus>::KIND, key.as_str(), &value);
                match bounded(call, timeout).await {
                    Ok(result) => result,
                    Err(_) => Err(PersistFailure::Timeout),
                }
            },
            quiet,
        );
    }
}

impl CollectionSession<ReviewGateState> {
    /// Section-level review state folded over the section's gates.
    pub fn section_state(&self, gate_ids: &[ItemId]) -> ReviewGateState {
        let gates: Vec<ReviewGateState> = gate_ids.iter().map(|id| self.status(id)).collect();
        derive_section_review_state(&gates)
    }
}
