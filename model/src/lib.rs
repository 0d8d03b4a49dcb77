mod duration;
pub use duration::Duration;

mod actor;
pub use actor::Actor;

mod columns;
pub use columns::{Column, ColumnLayout, WILDCARD_ACTOR};

mod step;
pub use step::{ImageRef, Step};

mod role;
pub use role::{TaskRole, TaskRoles};

mod concurrent_step;
pub use concurrent_step::{split_joint_key, ConcurrentStep};

mod task;
pub use task::{Task, TaskInvocation};

mod procedure;
pub use procedure::{sanitize_filename, Procedure};

mod source;
pub use source::{DirSource, Fetch, Source, TASKS_DIR};

mod error;
pub use error::{AggregatedErrors, Diagnostics, Errors};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Actor definition is missing 'role'")]
    MissingRole,
    #[error("Actor \"{0}\" is declared more than once")]
    DuplicateActor(String),
    #[error("Actor \"{0}\" is assigned to more than one column")]
    DuplicateColumnActor(String),
    #[error("Unknown column for actor \"{0}\". Consider adding wildcard '*' actor to a column")]
    UnknownActorColumn(String),
    #[error("Task file \"{0}\" declares role \"{1}\" but the procedure does not bind an actor to it")]
    UnboundRole(String, String),
    #[error("Joint actor key \"{0}\" has an empty actor; expected e.g. \"EV1 + EV2\"")]
    EmptyJointActor(String),
    #[error("Actor \"{0}\" appears more than once in the same division")]
    DuplicateSeries(String),
    #[error("Duration field '{0}' must be a non-negative integer, got: {1}")]
    NonIntegerDuration(&'static str, String),
    #[error("Duration of {0}h {1}m {2}s is too long to represent")]
    DurationOverflow(u64, u64, u64),
    #[error("{0} does not exist: '{1}'")]
    ItemNotFound(&'static str, String),
    #[error("URL tasks are disabled; unable to fetch '{0}'")]
    FetchDisabled(String),
}
