pub use session_core as core;
pub use session_data as data;
