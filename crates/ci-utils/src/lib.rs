pub mod interner;
pub mod io;
