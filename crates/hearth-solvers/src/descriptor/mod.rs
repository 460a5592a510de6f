//! Solver metadata records: raw candidates and validated descriptors.
//!
//! A discovery source yields [`SolverCandidate`] records — possibly
//! incomplete bundles of metadata plus a factory. The registry promotes each
//! candidate into an immutable [`SolverDescriptor`] via
//! [`SolverCandidate::into_descriptor`], rejecting any candidate that fails
//! to provide the full capability surface. [`SolverInfo`] is the
//! serializable snapshot handed out by query APIs.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::solver::{SolveError, Solver, SolverPriority};


/// Zero-argument constructor capability producing a solver instance.
///
/// Factories may fail; the manager wraps a factory failure in
/// [`SolverError::Instantiation`] naming the solver.
pub type SolverFactory<M> = Arc<dyn Fn() -> Result<Box<dyn Solver<M>>, SolveError> + Send + Sync>;

/// Raw, possibly-incomplete solver record yielded by a discovery source.
///
/// Candidates are built with the `with_*` methods and validated into a
/// [`SolverDescriptor`] during registry discovery. The `source_key`
/// identifies the candidate within its source so a rejection can name the
/// offending entry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_solvers::descriptor::SolverCandidate;
/// use hearth_solvers::solver::{SolveError, Solver, SolverPriority};
///
/// struct Climate;
///
/// impl Solver<()> for Climate {
///     fn name(&self) -> &str {
///         "climate"
///     }
///     fn version(&self) -> &str {
///         "1.0"
///     }
///     fn priority(&self) -> SolverPriority {
///         SolverPriority::Foundation
///     }
///     fn solve(&mut self, _model: &mut ()) -> Result<(), SolveError> {
///         Ok(())
///     }
/// }
///
/// let candidate: SolverCandidate<()> = SolverCandidate::new("climate-entry")
///     .with_name("climate")
///     .with_version("1.0")
///     .with_priority(SolverPriority::Foundation)
///     .with_depends_on(Vec::new())
///     .with_factory(Arc::new(|| Ok(Box::new(Climate))));
///
/// let descriptor = candidate.into_descriptor().expect("complete candidate");
/// assert_eq!(descriptor.name(), "climate");
/// ```
pub struct SolverCandidate<M> {
    source_key: String,
    name: Option<String>,
    version: Option<String>,
    priority: Option<SolverPriority>,
    depends_on: Option<Vec<String>>,
    description: Option<String>,
    factory: Option<SolverFactory<M>>,
}

impl<M> SolverCandidate<M> {
    /// Creates an empty candidate identified by `source_key` within its
    /// discovery source.
    #[must_use]
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            name: None,
            version: None,
            priority: None,
            depends_on: None,
            description: None,
            factory: None,
        }
    }

    /// Declares the solver's unique name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the solver's algorithm version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Declares the solver's priority tier.
    #[must_use]
    pub const fn with_priority(mut self, priority: SolverPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Declares the solvers this candidate depends on. Required even when
    /// empty; an absent dependency list fails validation.
    #[must_use]
    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    /// Attaches a human-readable description. Optional.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches the instance factory.
    #[must_use]
    pub fn with_factory(mut self, factory: SolverFactory<M>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Returns the candidate's identifier within its discovery source.
    #[must_use]
    pub const fn source_key(&self) -> &str {
        self.source_key.as_str()
    }

    /// Validates the candidate and promotes it to an immutable descriptor.
    ///
    /// The required capability surface is: a non-blank name, a version, a
    /// priority tier, a dependency list (possibly empty), and a factory.
    /// The description is optional and defaults to the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::ProtocolViolation`] naming every missing
    /// member at once.
    pub fn into_descriptor(self) -> Result<SolverDescriptor<M>, SolverError> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            missing.push(String::from("name"));
        }
        if self.version.is_none() {
            missing.push(String::from("version"));
        }
        if self.priority.is_none() {
            missing.push(String::from("priority"));
        }
        if self.depends_on.is_none() {
            missing.push(String::from("depends_on"));
        }
        if self.factory.is_none() {
            missing.push(String::from("factory"));
        }

        match (
            self.name,
            self.version,
            self.priority,
            self.depends_on,
            self.factory,
        ) {
            (Some(name), Some(version), Some(priority), Some(depends_on), Some(factory))
                if missing.is_empty() =>
            {
                Ok(SolverDescriptor {
                    name,
                    version,
                    priority,
                    depends_on: depends_on.into_iter().collect(),
                    description: self.description.unwrap_or_default(),
                    source_key: self.source_key,
                    factory,
                })
            }
            _ => Err(SolverError::ProtocolViolation {
                source_key: self.source_key,
                missing,
            }),
        }
    }
}

impl<M> Clone for SolverCandidate<M> {
    fn clone(&self) -> Self {
        Self {
            source_key: self.source_key.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            priority: self.priority,
            depends_on: self.depends_on.clone(),
            description: self.description.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<M> std::fmt::Debug for SolverCandidate<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverCandidate")
            .field("source_key", &self.source_key)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("priority", &self.priority)
            .field("depends_on", &self.depends_on)
            .field("description", &self.description)
            .field("factory", &self.factory.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Immutable identity and scheduling metadata for one registered solver.
///
/// Descriptors are created only by candidate validation during discovery,
/// replaced wholesale on re-discovery, and never mutated in place.
pub struct SolverDescriptor<M> {
    name: String,
    version: String,
    priority: SolverPriority,
    depends_on: BTreeSet<String>,
    description: String,
    source_key: String,
    factory: SolverFactory<M>,
}

impl<M> SolverDescriptor<M> {
    /// Returns the solver's unique name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the solver's algorithm version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the solver's priority tier.
    #[must_use]
    pub const fn priority(&self) -> SolverPriority {
        self.priority
    }

    /// Returns the names of solvers that must execute first.
    #[must_use]
    pub const fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the identifier the solver carried in its discovery source.
    #[must_use]
    pub const fn source_key(&self) -> &str {
        self.source_key.as_str()
    }

    /// Invokes the factory to produce a fresh solver instance.
    ///
    /// # Errors
    ///
    /// Propagates whatever the factory raised; the manager rewraps it in
    /// [`SolverError::Instantiation`].
    pub fn instantiate(&self) -> Result<Box<dyn Solver<M>>, SolveError> {
        (self.factory)()
    }

    /// Returns a serializable metadata snapshot.
    #[must_use]
    pub fn info(&self) -> SolverInfo {
        SolverInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            priority: self.priority,
            depends_on: self.depends_on.iter().cloned().collect(),
            description: self.description.clone(),
        }
    }
}

impl<M> Clone for SolverDescriptor<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            version: self.version.clone(),
            priority: self.priority,
            depends_on: self.depends_on.clone(),
            description: self.description.clone(),
            source_key: self.source_key.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<M> std::fmt::Debug for SolverDescriptor<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("priority", &self.priority)
            .field("depends_on", &self.depends_on)
            .field("description", &self.description)
            .field("source_key", &self.source_key)
            .finish_non_exhaustive()
    }
}

/// Serializable snapshot of one solver's metadata.
///
/// Dependency names are reported in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverInfo {
    name: String,
    version: String,
    priority: SolverPriority,
    depends_on: Vec<String>,
    description: String,
}

impl SolverInfo {
    /// Returns the solver name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the solver version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the priority tier.
    #[must_use]
    pub const fn priority(&self) -> SolverPriority {
        self.priority
    }

    /// Returns the declared dependency names.
    #[must_use]
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }
}

impl<M> From<&SolverDescriptor<M>> for SolverInfo {
    fn from(descriptor: &SolverDescriptor<M>) -> Self {
        descriptor.info()
    }
}
