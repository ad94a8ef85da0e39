pub(crate) mod categories;
pub(crate) mod health;
pub(crate) mod mappings;
pub(crate) mod options;
pub(crate) mod questions;
