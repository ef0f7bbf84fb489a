// Data types shared across the launcher.

// The remote release manifest and the entry picked from it.
pub mod release;
// The build-step parameter bundle.
pub mod step_config;
