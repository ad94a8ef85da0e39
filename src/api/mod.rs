pub(crate) mod categories;
pub(crate) mod errors;
pub(crate) mod evaluations;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod multipart;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod validation;
