pub mod enums;
pub mod donor;
pub mod donation;
pub mod hospital;
pub mod request;
pub mod filters;

pub use donor::*;
pub use donation::*;
pub use hospital::*;
pub use request::*;
pub use filters::*;
pub use enums::*;
