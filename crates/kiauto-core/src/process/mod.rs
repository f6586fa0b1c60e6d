pub mod errors;
pub mod operations;
pub mod supervisor;
pub mod types;

pub use errors::ProcessError;
pub use operations::{is_process_running, open_files, wait_for_file_created_by_process};
pub use supervisor::SupervisedProcess;
pub use types::{ChildHandle, Pid};
