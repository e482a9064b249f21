//! Walkthroughs showing the provisioning and content services in sequence.
//!
//! Every step logs what it does. A step whose prerequisite was not produced
//! by an earlier step reports that and is skipped.

pub mod content;
pub mod provisioning;

pub use content::ContentSample;
pub use provisioning::ProvisioningSample;
