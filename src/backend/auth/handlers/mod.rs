//! Authentication HTTP handlers

pub mod types;
pub mod signup;
pub mod verify;
pub mod login;
pub mod logout;
pub mod me;

pub use signup::signup;
pub use verify::verify_user;
pub use login::login;
pub use logout::logout;
pub use me::get_me;
