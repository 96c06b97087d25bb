//! Entity service layer: validation, partial-update merging, uniqueness checks and the
//! per-resource business operations built on the persistence gateway.

mod crud;
mod guard;
mod merge;
mod queries;
mod resource;
mod validation;

pub use crud::{EntityService, ServiceOptions, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use guard::{UniqueKey, UniquenessGuard};
pub use merge::{EmptyPatchPolicy, Merge, MergeOutcome};
pub use resource::Resource;
pub use validation::{Validate, Violations};
