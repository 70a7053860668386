//! Resource identity and registration options

use std::fmt;
use std::sync::Arc;

use cert_orchestrator_provider::CertificateManager;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::output::Output;

const URN_PREFIX: &str = "urn:certorch:";

/// Unique name of a registered resource.
///
/// `urn:certorch:{stack}::{project}::{qualified type}::{name}`, where the
/// qualified type is the parent's qualified type and the resource's own
/// type token joined by `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    pub fn new(
        stack: &str,
        project: &str,
        parent: Option<&Urn>,
        type_token: &str,
        name: &str,
    ) -> Self {
        let qualified_type = match parent.and_then(Urn::qualified_type) {
            Some(parent_type) => format!("{parent_type}${type_token}"),
            None => type_token.to_string(),
        };
        Self(format!(
            "{URN_PREFIX}{stack}::{project}::{qualified_type}::{name}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `[stack, project, qualified type, name]`
    fn parts(&self) -> Option<[&str; 4]> {
        let rest = self.0.strip_prefix(URN_PREFIX)?;
        let mut parts = rest.splitn(4, "::");
        Some([parts.next()?, parts.next()?, parts.next()?, parts.next()?])
    }

    pub fn stack(&self) -> Option<&str> {
        self.parts().map(|p| p[0])
    }

    pub fn project(&self) -> Option<&str> {
        self.parts().map(|p| p[1])
    }

    /// Type tokens of every ancestor and of the resource itself, `$`-joined.
    pub fn qualified_type(&self) -> Option<&str> {
        self.parts().map(|p| p[2])
    }

    /// The resource's own type token.
    pub fn type_token(&self) -> Option<&str> {
        self.qualified_type()
            .and_then(|t| t.rsplit('$').next())
    }

    pub fn name(&self) -> Option<&str> {
        self.parts().map(|p| p[3])
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options accepted by every registration.
#[derive(Clone, Default)]
pub struct ResourceOptions {
    /// Component the resource belongs to.
    pub parent: Option<Urn>,
    /// Outputs that must resolve before the resource is created.
    pub depends_on: Vec<Output<()>>,
    /// Overrides the engine's default certificate manager.
    pub certificate_manager: Option<Arc<dyn CertificateManager>>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parent(mut self, parent: Urn) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, output: Output<()>) -> Self {
        self.depends_on.push(output);
        self
    }

    #[must_use]
    pub fn certificate_manager(mut self, manager: Arc<dyn CertificateManager>) -> Self {
        self.certificate_manager = Some(manager);
        self
    }
}

impl fmt::Debug for ResourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOptions")
            .field("parent", &self.parent)
            .field("depends_on", &self.depends_on.len())
            .field(
                "certificate_manager",
                &self.certificate_manager.as_ref().map(|m| m.id()),
            )
            .finish()
    }
}

/// A registered resource and its eventual outputs.
pub struct Resource<O> {
    urn: Urn,
    output: Output<O>,
}

impl<O> Clone for Resource<O> {
    fn clone(&self) -> Self {
        Self {
            urn: self.urn.clone(),
            output: self.output.clone(),
        }
    }
}

impl<O: Clone> fmt::Debug for Resource<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("urn", &self.urn)
            .field("output", &self.output)
            .finish()
    }
}

impl<O> Resource<O> {
    pub(crate) fn new(urn: Urn, output: Output<O>) -> Self {
        Self { urn, output }
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn output(&self) -> &Output<O> {
        &self.output
    }
}

/// What a create step gets to work with.
pub struct CreateContext {
    urn: Urn,
    certificate_manager: Option<Arc<dyn CertificateManager>>,
}

impl CreateContext {
    pub(crate) fn new(urn: Urn, certificate_manager: Option<Arc<dyn CertificateManager>>) -> Self {
        Self {
            urn,
            certificate_manager,
        }
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// The manager from the resource options, else the engine default.
    pub fn certificate_manager(&self) -> CoreResult<Arc<dyn CertificateManager>> {
        self.certificate_manager.clone().ok_or_else(|| {
            CoreError::MissingProvider(format!("no certificate manager for {}", self.urn))
        })
    }
}
