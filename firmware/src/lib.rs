/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the ReRAM entropy firmware: run configuration,
    artifacts, test campaigns and the kernel run sequence.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod artifact;
pub mod campaign;
mod config;
mod env;
mod kernel;
mod run_status;

pub use artifact::{free_artifact_name, ArtifactWriter, MAX_ARTIFACT_INDEX};
pub use config::{ConfigError, RunConfig, RunMode, MAX_BITS, PARAMS_FILE};
pub use env::FwEnv;
pub use kernel::run;
pub use run_status::{blink, indicate_stop, LedPattern, RunStatus};

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Where the firmware was built to run.
        pub const BUILD_TARGET: &str = "host";
    } else {
        pub const BUILD_TARGET: &str = "bare-metal";
    }
}
