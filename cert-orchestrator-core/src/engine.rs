//! Resource registration and evaluation
//!
//! The [`Engine`] is the orchestrator the components register their
//! resources with. Each registration becomes a deferred step that:
//!
//! 1. waits for every `depends_on` output,
//! 2. resolves the resource inputs,
//! 3. compares them with the persisted state and only runs the create step
//!    when they changed,
//! 4. records the outcome for the [`DeploymentSummary`].
//!
//! Nothing runs until [`Engine::finish`] (or a consumer) awaits the outputs.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cert_orchestrator_provider::CertificateManager;
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};
use crate::output::Output;
use crate::resource::{CreateContext, Resource, ResourceOptions, Urn};
use crate::state::{InMemoryStateStore, ResourceState, StateStore};

/// What happened to a resource during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOp {
    /// No previous state; created.
    Create,
    /// Inputs unchanged; previous outputs reused.
    Same,
    /// Inputs changed; created again.
    Replace,
}

impl fmt::Display for StepOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Create => "create",
            Self::Same => "same",
            Self::Replace => "replace",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStep {
    pub urn: Urn,
    pub op: StepOp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFailure {
    pub urn: Urn,
    pub error: CoreError,
}

/// Outcome of [`Engine::finish`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    /// Successful steps, in completion order.
    pub steps: Vec<ResourceStep>,
    /// Failed resources, in registration order.
    pub failures: Vec<ResourceFailure>,
    /// Resources found in the state store that were not registered this time.
    pub untracked: Vec<Urn>,
}

impl DeploymentSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Nothing was created or replaced and nothing failed.
    pub fn is_noop(&self) -> bool {
        self.is_success() && self.steps.iter().all(|s| s.op == StepOp::Same)
    }

    pub fn count(&self, op: StepOp) -> usize {
        self.steps.iter().filter(|s| s.op == op).count()
    }
}

struct EngineInner {
    project: String,
    stack: String,
    state: Arc<dyn StateStore>,
    certificate_manager: Option<Arc<dyn CertificateManager>>,
    registered: Mutex<HashSet<Urn>>,
    steps: Mutex<Vec<ResourceStep>>,
    pending: Mutex<Vec<(Urn, Output<()>)>>,
}

/// Never held across an `.await`.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    project: String,
    stack: String,
    state: Option<Arc<dyn StateStore>>,
    certificate_manager: Option<Arc<dyn CertificateManager>>,
}

impl EngineBuilder {
    /// Where resource state is read from and written to (default: in memory).
    #[must_use]
    pub fn state_store(mut self, state: Arc<dyn StateStore>) -> Self {
        self.state = Some(state);
        self
    }

    /// Certificate manager used by resources that do not set their own.
    #[must_use]
    pub fn certificate_manager(mut self, manager: Arc<dyn CertificateManager>) -> Self {
        self.certificate_manager = Some(manager);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                project: self.project,
                stack: self.stack,
                state: self
                    .state
                    .unwrap_or_else(|| Arc::new(InMemoryStateStore::new())),
                certificate_manager: self.certificate_manager,
                registered: Mutex::new(HashSet::new()),
                steps: Mutex::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// Orchestration engine for one evaluation of a stack.
///
/// Cheap to clone; clones share the same registrations.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn builder(project: impl Into<String>, stack: impl Into<String>) -> EngineBuilder {
        EngineBuilder {
            project: project.into(),
            stack: stack.into(),
            state: None,
            certificate_manager: None,
        }
    }

    pub fn project(&self) -> &str {
        &self.inner.project
    }

    pub fn stack(&self) -> &str {
        &self.inner.stack
    }

    fn claim_urn(&self, type_token: &str, name: &str, parent: Option<&Urn>) -> CoreResult<Urn> {
        if name.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "{type_token}: resource name must not be empty"
            )));
        }
        let urn = Urn::new(&self.inner.stack, &self.inner.project, parent, type_token, name);
        if !lock(&self.inner.registered).insert(urn.clone()) {
            return Err(CoreError::DuplicateUrn(urn.to_string()));
        }
        Ok(urn)
    }

    /// Register a component: a named grouping with no create step of its own.
    ///
    /// The returned URN is meant to be the `parent` of the component's resources.
    pub fn register_component(
        &self,
        type_token: &str,
        name: &str,
        opts: &ResourceOptions,
    ) -> CoreResult<Urn> {
        let urn = self.claim_urn(type_token, name, opts.parent.as_ref())?;
        log::debug!("Registered component {urn}");
        Ok(urn)
    }

    /// Register a resource whose `create` step runs when its inputs differ
    /// from the persisted ones.
    ///
    /// `create` is never called if a `depends_on` output fails; the resource
    /// then fails with [`CoreError::DependencyFailed`].
    pub fn register_resource<I, O, F, Fut>(
        &self,
        type_token: &str,
        name: &str,
        opts: ResourceOptions,
        inputs: Output<I>,
        create: F,
    ) -> CoreResult<Resource<O>>
    where
        I: Serialize + Clone + Send + Sync + 'static,
        O: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce(CreateContext, I) -> Fut + Send + 'static,
        Fut: Future<Output = CoreResult<O>> + Send + 'static,
    {
        let urn = self.claim_urn(type_token, name, opts.parent.as_ref())?;
        let ctx = CreateContext::new(
            urn.clone(),
            opts.certificate_manager
                .or_else(|| self.inner.certificate_manager.clone()),
        );

        let inner = Arc::clone(&self.inner);
        let type_token = type_token.to_string();
        let resource_urn = urn.clone();
        let depends_on = opts.depends_on;

        let output = Output::from_future(async move {
            let urn = resource_urn;

            if let Err(cause) = try_join_all(depends_on.iter().map(Output::resolve)).await {
                return Err(CoreError::DependencyFailed {
                    urn: urn.to_string(),
                    cause: Box::new(cause),
                });
            }

            let inputs = inputs.resolve().await?;
            let input_json = serde_json::to_value(&inputs)
                .map_err(|e| CoreError::SerializationError(format!("{urn} inputs: {e}")))?;

            let previous = inner.state.get(&urn).await?;
            let op = match &previous {
                Some(prev) if prev.type_token == type_token && prev.inputs == input_json => {
                    let outputs: O = serde_json::from_value(prev.outputs.clone()).map_err(|e| {
                        CoreError::SerializationError(format!("{urn} stored outputs: {e}"))
                    })?;
                    log::debug!("= {urn} unchanged");
                    lock(&inner.steps).push(ResourceStep {
                        urn,
                        op: StepOp::Same,
                    });
                    return Ok(outputs);
                }
                Some(_) => StepOp::Replace,
                None => StepOp::Create,
            };

            log::info!("{} {urn}", if op == StepOp::Create { "+" } else { "+-" });
            let outputs = create(ctx, inputs).await?;
            let output_json = serde_json::to_value(&outputs)
                .map_err(|e| CoreError::SerializationError(format!("{urn} outputs: {e}")))?;

            inner
                .state
                .put(ResourceState {
                    urn: urn.clone(),
                    type_token,
                    inputs: input_json,
                    outputs: output_json,
                })
                .await?;
            lock(&inner.steps).push(ResourceStep { urn, op });
            Ok(outputs)
        });

        lock(&self.inner.pending).push((urn.clone(), output.void()));
        Ok(Resource::new(urn, output))
    }

    /// Drive every registered resource, including the ones registered while
    /// driving, and report what happened.
    pub async fn finish(&self) -> DeploymentSummary {
        let mut failures = Vec::new();

        loop {
            let pending = std::mem::take(&mut *lock(&self.inner.pending));
            if pending.is_empty() {
                break;
            }
            let results = join_all(pending.iter().map(|(_, output)| output.resolve())).await;
            for ((urn, _), result) in pending.into_iter().zip(results) {
                if let Err(error) = result {
                    if error.is_expected() {
                        log::warn!("{urn} failed: {error}");
                    } else {
                        log::error!("{urn} failed: {error}");
                    }
                    failures.push(ResourceFailure { urn, error });
                }
            }
        }

        let untracked = match self.inner.state.list().await {
            Ok(stored) => {
                let registered = lock(&self.inner.registered);
                stored
                    .into_iter()
                    .map(|s| s.urn)
                    .filter(|urn| !registered.contains(urn))
                    .collect()
            }
            Err(e) => {
                log::warn!("Could not list stored resources: {e}");
                Vec::new()
            }
        };
        for urn in &untracked {
            log::warn!("{urn} is in the state but was not registered; it is left as is");
        }

        DeploymentSummary {
            steps: lock(&self.inner.steps).clone(),
            failures,
            untracked,
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("project", &self.inner.project)
            .field("stack", &self.inner.stack)
            .field("registered", &lock(&self.inner.registered).len())
            .finish_non_exhaustive()
    }
}
