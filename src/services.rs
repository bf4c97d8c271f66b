//! Registry and annotation service collaborators.

mod models;
pub use models::*;

pub mod fields;
pub use fields::DnaSchemaType;

mod registry;
pub use registry::*;

mod igblast;
pub use igblast::*;

mod session;
pub use session::*;
