//! Unit tests - fast, isolated tests without external dependencies
//!
//! Most unit tests are embedded in source files with #[cfg(test)] modules
//! and run with `cargo test --lib`.

#[cfg(test)]
mod tests {
    // Unit tests are embedded in source files with #[cfg(test)].
    // This module serves as a placeholder for future standalone unit test files.
}
