pub mod chrome;
pub mod login;
#[cfg(test)]
pub(crate) mod mock;
pub mod session;

pub use chrome::ChromeBrowser;
pub use login::LoginFlow;
pub use session::Session;
