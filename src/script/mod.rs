//! Wire format of the scene script and its delivery.

pub mod codec;
pub mod command;
pub mod html;
