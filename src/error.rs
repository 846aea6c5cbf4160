use std::fmt;

/// A startup failure that terminates the program.
///
/// Each kind carries a distinct process exit code so a launcher (or a test
/// harness) can tell the failure stages apart:
///
/// - window creation → 1
/// - GPU adapter/device acquisition → 2
/// - swap chain (surface) creation or configuration → 3
///
/// Everything past this stage is either recoverable (surface reconfigure) or
/// deliberately non-fatal (shader compilation, see `render::shader`).
#[derive(Debug)]
pub enum FatalError {
    /// The native window (or the event loop that owns it) could not be created.
    WindowCreation(anyhow::Error),
    /// No suitable GPU adapter, or the logical device could not be created.
    DeviceAcquisition(anyhow::Error),
    /// The surface could not be created or has no usable configuration.
    SwapChainCreation(anyhow::Error),
}

impl FatalError {
    pub fn window(err: impl Into<anyhow::Error>) -> Self {
        Self::WindowCreation(err.into())
    }

    pub fn device(err: impl Into<anyhow::Error>) -> Self {
        Self::DeviceAcquisition(err.into())
    }

    pub fn swap_chain(err: impl Into<anyhow::Error>) -> Self {
        Self::SwapChainCreation(err.into())
    }

    /// Process exit code for this failure kind. Never 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::WindowCreation(_) => 1,
            Self::DeviceAcquisition(_) => 2,
            Self::SwapChainCreation(_) => 3,
        }
    }

    fn cause(&self) -> &anyhow::Error {
        match self {
            Self::WindowCreation(err)
            | Self::DeviceAcquisition(err)
            | Self::SwapChainCreation(err) => err,
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::WindowCreation(_) => "failed to create window",
            Self::DeviceAcquisition(_) => "failed to acquire GPU device",
            Self::SwapChainCreation(_) => "failed to create swap chain",
        };
        write!(f, "{stage}: {:#}", self.cause())
    }
}

impl std::error::Error for FatalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> [FatalError; 3] {
        [
            FatalError::window(anyhow::anyhow!("w")),
            FatalError::device(anyhow::anyhow!("d")),
            FatalError::swap_chain(anyhow::anyhow!("s")),
        ]
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let codes: Vec<u8> = all().iter().map(FatalError::exit_code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn display_names_the_stage() {
        let [w, d, s] = all();
        assert!(w.to_string().starts_with("failed to create window"));
        assert!(d.to_string().starts_with("failed to acquire GPU device"));
        assert!(s.to_string().starts_with("failed to create swap chain"));
    }
}
