pub mod debounce;
pub mod history;
pub mod session;
pub mod suggestions;
