//! Authentication input validation
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AuthValidator`] | Rule registry, execution modes, batches and statistics |
//! | [`ValidationRule`] | Named, prioritized check over one item kind |
//! | [`RuleGroup`] | Named set of rules run under one execution mode |
//! | [`builtin`] | Credential, token, user, event and context rules |

pub mod builtin;
pub mod rule;
pub mod validator;

pub use rule::{RuleCheck, RuleGroup, ValidationRule};
pub use self::validator::{AuthValidator, ValidationStatistics};
