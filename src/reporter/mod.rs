pub mod mailer;
pub mod render;

pub use mailer::{Mailer, SendError};
pub use render::{Rendered, render};
