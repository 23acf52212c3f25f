//! Wire types shared with the identity provider and the marketplace backend.

pub mod loan;
pub mod order;
pub mod payment;
pub mod product;
pub mod profile;
pub mod session;

pub use loan::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use profile::*;
pub use session::*;
