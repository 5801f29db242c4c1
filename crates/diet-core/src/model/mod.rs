pub mod meal;
pub mod session;

pub use meal::*;
pub use session::*;

#[cfg(test)]
mod tests;
