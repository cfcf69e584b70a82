//! Command surface.
//!
//! # Data Flow
//! ```text
//! host chat/console input
//!     → CommandRegistry::dispatch(sender, label, args)
//!     → permission gate → Command::execute
//!     → replies buffered on CommandSender
//! ```

pub mod hcf;
pub mod registry;
pub mod sender;

pub use hcf::HcfCommand;
pub use registry::{filter_starting_with, Command, CommandRegistry};
pub use sender::CommandSender;
