// SPDX-License-Identifier: Apache-2.0

//! A declarative policy engine over attestation report fields.
//!
//! Policies are supplied as a JSON array. Each entry names a registered
//! policy kind, optional caller-visible identifier, and kind-specific
//! parameters:
//!
//! ```json
//! [
//!     {
//!         "type": "equals",
//!         "id": "measurement",
//!         "params": {
//!             "field": "MEASUREMENT",
//!             "referenceValue": "base64..."
//!         }
//!     }
//! ]
//! ```
//!
//! Parsing and evaluation are separate phases: [`PolicyRegistry::parse`]
//! instantiates every policy or fails, and [`check_policies`] evaluates
//! the instantiated list against a decoded report. A policy that does
//! not hold is an ordinary verdict, not an error; errors are reserved
//! for malformed policy lists and internal evaluation failures.

mod equals;
mod greater_equal;
mod tcb_greater_equal;

pub use equals::Equals;
pub use greater_equal::GreaterEqual;
pub use tcb_greater_equal::TcbGreaterEqual;

use crate::{error::PolicyError, report::AttestationReport};

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize};

/// Byte-valued policy parameters are carried as base64 strings in JSON.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// The outcome of evaluating a single policy against a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyCheck {
    /// The policy holds for the report.
    Passed,

    /// The policy does not hold; the reason is caller-facing text.
    Failed(String),
}

/// A single check against a decoded attestation report.
pub trait Policy: std::fmt::Debug + Send + Sync {
    /// Evaluate this policy against the report.
    ///
    /// A policy that does not hold reports [`PolicyCheck::Failed`] with
    /// a human-readable reason. Errors are reserved for internal
    /// failures that make the outcome unknowable.
    fn check(&self, report: &AttestationReport) -> Result<PolicyCheck, PolicyError>;
}

/// An instantiated policy together with its caller-visible identifier.
#[derive(Debug)]
pub struct PolicyWrapper {
    /// Identifier used in failure reasons and error wrapping.
    pub id: Option<String>,

    /// The instantiated policy.
    pub policy: Box<dyn Policy>,
}

type PolicyFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Policy>, PolicyError> + Send + Sync>;

/// Maps policy type tags to factories that instantiate them from JSON
/// parameters.
///
/// The registry is an explicit value so different callers can expose
/// different policy vocabularies.
#[derive(Default)]
pub struct PolicyRegistry {
    factories: HashMap<String, PolicyFactory>,
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PolicyRegistry {
    /// Creates a registry with no registered policy kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the builtin policy kinds registered:
    /// `equals`, `greaterEqual` and `tcbGreaterEqual`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_kind::<Equals>("equals");
        registry.register_kind::<GreaterEqual>("greaterEqual");
        registry.register_kind::<TcbGreaterEqual>("tcbGreaterEqual");
        registry
    }

    /// Registers a policy factory under a type tag. A previously
    /// registered factory for the same tag is replaced.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Policy>, PolicyError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Registers a policy kind that deserializes its parameters directly
    /// from the JSON `params` object.
    pub fn register_kind<P>(&mut self, kind: &str)
    where
        P: Policy + DeserializeOwned + 'static,
    {
        let tag = kind.to_string();
        self.register(kind, move |params: &serde_json::Value| {
            serde_json::from_value::<P>(params.clone())
                .map(|policy| Box::new(policy) as Box<dyn Policy>)
                .map_err(|source| PolicyError::InvalidParams {
                    kind: tag.clone(),
                    source,
                })
        });
    }

    /// Returns whether a policy kind is registered under `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Parses a JSON policy list and instantiates every entry.
    ///
    /// Fails on the first entry whose type tag is unregistered or whose
    /// parameters its factory rejects; no policy is evaluated during
    /// parsing.
    pub fn parse(&self, json: &[u8]) -> Result<Vec<PolicyWrapper>, PolicyError> {
        let raw: Vec<RawPolicy> = serde_json::from_slice(json)?;

        raw.into_iter()
            .map(|entry| {
                let factory = self
                    .factories
                    .get(&entry.kind)
                    .ok_or_else(|| PolicyError::UnknownPolicyType(entry.kind.clone()))?;

                Ok(PolicyWrapper {
                    id: entry.id,
                    policy: factory(&entry.params)?,
                })
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct RawPolicy {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    params: serde_json::Value,
}

/// The aggregate outcome of evaluating a policy list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyVerdict {
    /// Every policy holds.
    Passed,

    /// At least one policy does not hold. Carries one reason line per
    /// failing policy.
    Failed(String),
}

/// Evaluates every policy in the list against the report.
///
/// All policies are evaluated even after a failure so the verdict names
/// every failing policy. An internal evaluation error short-circuits and
/// is wrapped with the identifier of the failing policy.
pub fn check_policies(
    policies: &[PolicyWrapper],
    report: &AttestationReport,
) -> Result<PolicyVerdict, PolicyError> {
    let mut reasons = String::new();

    for wrapper in policies {
        let check = wrapper
            .policy
            .check(report)
            .map_err(|source| PolicyError::Evaluation {
                id: wrapper.id.clone(),
                source: Box::new(source),
            })?;

        if let PolicyCheck::Failed(reason) = check {
            match &wrapper.id {
                Some(id) => reasons.push_str(&format!("Policy {id} failed: {reason}\n")),
                None => reasons.push_str(&format!("Policy failed: {reason}\n")),
            }
        }
    }

    if reasons.is_empty() {
        Ok(PolicyVerdict::Passed)
    } else {
        Ok(PolicyVerdict::Failed(reasons))
    }
}
