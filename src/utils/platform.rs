// utils/platform.rs

//! Operating system detection and executable naming.

/// Supported platforms.
#[derive(Debug, PartialEq)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

/// Determine the current operating system
pub fn get_platform() -> Platform {
    if cfg!(target_os = "windows") {
        Platform::Windows
    } else if cfg!(target_os = "macos") {
        Platform::MacOS
    } else if cfg!(target_os = "linux") {
        Platform::Linux
    } else {
        Platform::Unknown
    }
}

/// File name of an executable on this platform (`wkhtmltopdf.exe` on Windows).
pub fn executable_name(name: &str) -> String {
    if get_platform() == Platform::Windows && !name.to_lowercase().ends_with(".exe") {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        let name = executable_name("wkhtmltopdf");
        if cfg!(target_os = "windows") {
            assert_eq!(name, "wkhtmltopdf.exe");
        } else {
            assert_eq!(name, "wkhtmltopdf");
        }
        assert_eq!(executable_name("tool.exe"), "tool.exe");
    }
}
