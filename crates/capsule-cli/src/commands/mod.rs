//! Command handlers.

mod autounlock;
mod check;
mod create;
mod doctor;
mod init;
mod unlock;

pub use autounlock::handle_autounlock;
pub use check::handle_check;
pub use create::handle_create;
pub use doctor::handle_doctor;
pub use init::handle_init;
pub use unlock::handle_unlock;
