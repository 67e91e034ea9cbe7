pub mod notation;
pub mod nuclide;
pub mod reaction;
