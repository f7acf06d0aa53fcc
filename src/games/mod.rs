//! Game rule engines.

pub mod dragon_face;
