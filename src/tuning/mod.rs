//! Data-driven balance tables
//!
//! Crack profiles, fragmentation rule sets and the shared growth tunables,
//! plus the [`Registry`] that resolves variant keys to them.

pub mod defaults;
pub mod profile;
pub mod registry;
pub mod rules;

pub use defaults::{CRYSTAL_KEY, DEFAULT_KEY, DENSE_CORE_KEY, PARASITE_KEY, VOLATILE_KEY};
pub use profile::{ChildPenalties, CrackProfile, GrowthRules, RingSpec, STAGE_COUNT, Span, StageTemplate};
pub use registry::{Registry, RegistryConfig, VariantBinding};
pub use rules::{CountRange, FragmentRuleSet, MAX_FRAGMENT_COUNT, SizeTable};
