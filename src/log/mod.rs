pub mod session_log;
