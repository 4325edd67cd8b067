//! Log routing and rotation
//!
//! Entries emitted through `tracing` go to standard error behind an
//! [`OutputGate`] and, when file output is configured, are mirrored by a
//! [`MirrorHook`] into hourly [`RotationWriter`] buckets.

mod clock;
mod entry;
mod file_logger;
mod gate;
mod hook;
mod level;
mod retention;
mod rotation;
mod router;
mod subscriber;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Fields, LogEntry};
pub use file_logger::{format_line, FileLogger};
pub use gate::{ConsoleWriter, OutputGate};
pub use hook::{Hook, HookLayer, MirrorHook, PANIC_FIELD};
pub use level::{Level, ModeCell, OutputMode};
pub use retention::{bucket_stamp, prune_expired};
pub use rotation::{RotationPolicy, RotationWriter, BUCKET_FORMAT, PATH_PLACEHOLDER};
pub use router::LogRouter;
pub use subscriber::install;
