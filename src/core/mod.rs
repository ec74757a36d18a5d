pub mod browser;
pub mod page;

pub use browser::BrowserTrait;
pub use page::{SearchPage, SearchResolution};
