//! Shader source loading.
//!
//! The pipeline is compiled from an external `shader.wgsl` shipped alongside
//! the executable, not from an embedded string. A missing file or a
//! compilation error is reported and the program keeps running without a
//! pipeline; the renderer then draws nothing. Keeping this tier non-fatal
//! while device setup is fatal is inherited behavior, documented in DESIGN.md.

use std::path::{Path, PathBuf};

pub(crate) const SHADER_FILE: &str = "shader.wgsl";

/// Picks the shader path: next to the executable if present, otherwise the
/// working directory.
pub(crate) fn locate(exe_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = exe_dir {
        let candidate = dir.join(SHADER_FILE);
        if candidate.is_file() {
            return candidate;
        }
    }
    PathBuf::from(SHADER_FILE)
}

/// Reads the shader source from disk.
///
/// Returns `None` (after reporting) if the file cannot be read.
pub(crate) fn load_source() -> Option<String> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let path = locate(exe_dir.as_deref());

    match std::fs::read_to_string(&path) {
        Ok(source) => Some(source),
        Err(err) => {
            log::error!("failed to read shader file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_prefers_executable_directory() {
        let dir = std::env::temp_dir().join("learning-wgpu-shader-locate");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SHADER_FILE), "// shader").unwrap();

        assert_eq!(locate(Some(&dir)), dir.join(SHADER_FILE));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn locate_falls_back_to_working_directory() {
        let dir = std::env::temp_dir().join("learning-wgpu-shader-locate-empty");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::remove_file(dir.join(SHADER_FILE)).ok();

        assert_eq!(locate(Some(&dir)), PathBuf::from(SHADER_FILE));
        assert_eq!(locate(None), PathBuf::from(SHADER_FILE));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn shipped_shader_declares_both_entry_points() {
        let source = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shader.wgsl"));
        assert!(source.contains("fn vs_main"));
        assert!(source.contains("fn fs_main"));
        // Both vertex attributes must be consumed.
        assert!(source.contains("@location(0) position: vec3<f32>"));
        assert!(source.contains("@location(1) color: vec4<f32>"));
    }
}
