//! License tiers and the caller-supplied license capability.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Subscription tiers, ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LicenseTier {
    Basic,
    Gold,
    Platinum,
    Enterprise,
}

impl LicenseTier {
    /// Upper-case name used in license diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            LicenseTier::Basic => "BASIC",
            LicenseTier::Gold => "GOLD",
            LicenseTier::Platinum => "PLATINUM",
            LicenseTier::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown license tier [{0}]")]
pub struct UnknownLicenseTier(pub String);

impl FromStr for LicenseTier {
    type Err = UnknownLicenseTier;

    /// Tier names compare case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BASIC" => Ok(LicenseTier::Basic),
            "GOLD" => Ok(LicenseTier::Gold),
            "PLATINUM" => Ok(LicenseTier::Platinum),
            "ENTERPRISE" => Ok(LicenseTier::Enterprise),
            _ => Err(UnknownLicenseTier(s.to_string())),
        }
    }
}

impl TryFrom<String> for LicenseTier {
    type Error = UnknownLicenseTier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LicenseTier> for String {
    fn from(value: LicenseTier) -> Self {
        value.name().to_ascii_lowercase()
    }
}

/// Answers whether the current deployment holds at least a given license tier.
///
/// Hosts whose license information arrives asynchronously resolve it before
/// validating and pass a [`StaticLicense`] or a closure.
pub trait LicenseContext: Send + Sync {
    fn has_at_least(&self, tier: LicenseTier) -> bool;
}

/// A fixed license tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticLicense(pub LicenseTier);

impl LicenseContext for StaticLicense {
    fn has_at_least(&self, tier: LicenseTier) -> bool {
        self.0 >= tier
    }
}

impl<F> LicenseContext for F
where
    F: Fn(LicenseTier) -> bool + Send + Sync,
{
    fn has_at_least(&self, tier: LicenseTier) -> bool {
        self(tier)
    }
}

/// Per-run license answers keyed by function name and signature index
/// (`None` for a definition-level license).
pub(crate) struct LicenseGate<'l> {
    context: Option<&'l dyn LicenseContext>,
    answers: HashMap<(SmolStr, Option<usize>), bool>,
}

impl<'l> LicenseGate<'l> {
    pub(crate) fn new(context: Option<&'l dyn LicenseContext>) -> Self {
        Self {
            context,
            answers: HashMap::new(),
        }
    }

    /// Returns true when `tier` is available. Without a context every tier is.
    pub(crate) fn allows(
        &mut self,
        function: &SmolStr,
        signature: Option<usize>,
        tier: LicenseTier,
    ) -> bool {
        let Some(context) = self.context else {
            return true;
        };
        *self
            .answers
            .entry((function.clone(), signature))
            .or_insert_with(|| {
                let allowed = context.has_at_least(tier);
                trace!(%function, ?signature, %tier, allowed, "license check");
                allowed
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn tiers_are_ordered() {
        assert!(LicenseTier::Platinum > LicenseTier::Gold);
        assert!(StaticLicense(LicenseTier::Enterprise).has_at_least(LicenseTier::Platinum));
        assert!(!StaticLicense(LicenseTier::Basic).has_at_least(LicenseTier::Gold));
    }

    #[test]
    fn tier_names_are_case_insensitive() {
        assert_eq!("platinum".parse(), Ok(LicenseTier::Platinum));
        assert_eq!("Gold".parse(), Ok(LicenseTier::Gold));
        assert!("silver".parse::<LicenseTier>().is_err());
        let tier: LicenseTier = serde_json::from_str("\"PLATINUM\"").unwrap();
        assert_eq!(tier, LicenseTier::Platinum);
    }

    #[test]
    fn closures_act_as_contexts() {
        let only_gold = |tier: LicenseTier| tier <= LicenseTier::Gold;
        assert!(only_gold.has_at_least(LicenseTier::Basic));
        assert!(!only_gold.has_at_least(LicenseTier::Platinum));
    }

    #[test]
    fn gate_memoizes_per_function_and_signature() {
        let calls = AtomicUsize::new(0);
        let context = |_tier: LicenseTier| {
            calls.fetch_add(1, Ordering::SeqCst);
            false
        };
        let mut gate = LicenseGate::new(Some(&context));
        let name = SmolStr::new("platinum_function_mock");

        assert!(!gate.allows(&name, None, LicenseTier::Platinum));
        assert!(!gate.allows(&name, None, LicenseTier::Platinum));
        assert!(!gate.allows(&name, Some(1), LicenseTier::Platinum));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn gate_without_context_allows_everything() {
        let mut gate = LicenseGate::new(None);
        assert!(gate.allows(&"f".into(), None, LicenseTier::Enterprise));
    }
}
