mod interval;
mod session_key;

pub use interval::Interval;
pub use session_key::SessionKey;
