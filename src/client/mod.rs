pub mod request;
pub mod transport;
pub mod types;

pub use request::build_url;
pub use transport::{Client, ClientBuilder, USER_AGENT, parse_generated};
pub use types::{Encoding, Mode, Screenshot, ScreenshotOptions, ScreenshotSummary, Status, Thumbnail};
