use std::path::{Path, PathBuf};

pub fn manifest_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> PathBuf {
    let segments = segments.into_iter();
    let full_path = [env!("CARGO_MANIFEST_DIR")].into_iter().chain(segments);
    full_path.collect()
}

/// The identifier used for a shader's defines and constants:
/// its file name with everything that can't appear in a c identifier
/// replaced by '_'
pub fn shader_name_from_path(input_path: &Path) -> String {
    let file_name = input_path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    let mut shader_name: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if shader_name.starts_with(|c: char| c.is_ascii_digit()) {
        shader_name.insert(0, '_');
    }

    shader_name
}

/// `<file name up to the last dot>.h`, in the current directory
pub fn default_output_path(input_path: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    PathBuf::from(format!("{stem}.h"))
}
