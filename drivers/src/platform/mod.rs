//! Platform Abstraction Layer
//!
//! SoC-level drivers. They are generic over a
//! [`RegisterFile`](crate::hal::register::RegisterFile), so the same code
//! runs against memory-mapped hardware or the in-memory models in
//! [`sim`](crate::sim).

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "mc1322x")] {
        pub mod mc1322x;
        pub use mc1322x as current;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features mc1322x"
        );
    }
}
