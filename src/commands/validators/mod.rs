//! Validators for user input in the init command.
//!
//! They apply the same rules `config set` uses, so a value accepted by a prompt is also
//! accepted when set by hand.

pub mod object_id;
pub mod url;

pub use object_id::ObjectIdValidator;
pub use url::UrlValidator;
