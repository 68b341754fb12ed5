//! Build tooling for Ferrule plugins.
//!
//! Usage: cargo xtask bundle <package> [--release] [--install]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args[1] != "bundle" {
        print_usage();
        std::process::exit(1);
    }

    let package = &args[2];
    let release = args.iter().any(|a| a == "--release");
    let install = args.iter().any(|a| a == "--install");

    if let Err(e) = bundle(package, release, install) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask bundle <package> [--release] [--install]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  bundle    Build and package a VST 2.4 plugin");
    eprintln!();
    eprintln!("Output:");
    eprintln!("  macOS      <Name>.vst bundle");
    eprintln!("  Windows    <Name>.dll");
    eprintln!("  Linux      <Name>.so");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --release    Build in release mode");
    eprintln!("  --install    Install to the user plugin directory (or $VST_PATH)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  cargo xtask bundle ferrule-gain --release --install");
}

/// Shared library naming of the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// File cargo produces for a `cdylib` named `lib_name`.
    fn library_file(self, lib_name: &str) -> String {
        match self {
            Platform::MacOs => format!("lib{}.dylib", lib_name),
            Platform::Windows => format!("{}.dll", lib_name),
            Platform::Linux => format!("lib{}.so", lib_name),
        }
    }

    /// File or bundle name the host scans for.
    fn plugin_file(self, display_name: &str) -> String {
        match self {
            Platform::MacOs => format!("{}.vst", display_name),
            Platform::Windows => format!("{}.dll", display_name),
            Platform::Linux => format!("{}.so", display_name),
        }
    }

    fn default_install_dir(self) -> Result<PathBuf, String> {
        match self {
            Platform::MacOs => Ok(home_dir()?
                .join("Library")
                .join("Audio")
                .join("Plug-Ins")
                .join("VST")),
            Platform::Windows => {
                let program_files = std::env::var("ProgramFiles")
                    .map_err(|_| "ProgramFiles not set; use VST_PATH")?;
                Ok(PathBuf::from(program_files).join("Steinberg").join("VstPlugins"))
            }
            Platform::Linux => Ok(home_dir()?.join(".vst")),
        }
    }
}

fn home_dir() -> Result<PathBuf, String> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| "HOME not set".to_string())
}

fn bundle(package: &str, release: bool, install: bool) -> Result<(), String> {
    println!("Bundling {} (release: {})...", package, release);

    // Get workspace root
    let workspace_root = get_workspace_root()?;

    // Build the plugin
    println!("Building...");
    let mut cmd = Command::new("cargo");
    cmd.arg("build")
        .arg("-p")
        .arg(package)
        .current_dir(&workspace_root);

    if release {
        cmd.arg("--release");
    }

    let status = cmd.status().map_err(|e| format!("Failed to run cargo: {}", e))?;
    if !status.success() {
        return Err("Build failed".to_string());
    }

    // Determine paths
    let profile = if release { "release" } else { "debug" };
    let target_dir = workspace_root.join("target").join(profile);
    let platform = Platform::current();

    // Convert package name to library name (replace hyphens with underscores)
    let lib_name = package.replace('-', "_");
    let library_path = target_dir.join(platform.library_file(&lib_name));

    if !library_path.exists() {
        return Err(format!("Built library not found: {}", library_path.display()));
    }

    let display_name = to_display_name(package);
    let plugin_path = target_dir.join(platform.plugin_file(&display_name));

    match platform {
        Platform::MacOs => create_mac_bundle(package, &display_name, &library_path, &plugin_path)?,
        Platform::Windows | Platform::Linux => {
            fs::copy(&library_path, &plugin_path)
                .map_err(|e| format!("Failed to copy library: {}", e))?;
        }
    }

    println!("VST plugin created: {}", plugin_path.display());

    // Install if requested
    if install {
        let install_dir = match std::env::var_os("VST_PATH") {
            Some(path) => PathBuf::from(path),
            None => platform.default_install_dir()?,
        };
        install_plugin(&plugin_path, &install_dir)?;
    }

    Ok(())
}

fn create_mac_bundle(
    package: &str,
    display_name: &str,
    library_path: &Path,
    bundle_dir: &Path,
) -> Result<(), String> {
    // Create bundle directory structure
    let contents_dir = bundle_dir.join("Contents");
    let macos_dir = contents_dir.join("MacOS");

    println!("Creating VST bundle at {}...", bundle_dir.display());

    // Clean up existing bundle
    if bundle_dir.exists() {
        fs::remove_dir_all(bundle_dir)
            .map_err(|e| format!("Failed to remove old bundle: {}", e))?;
    }

    fs::create_dir_all(&macos_dir).map_err(|e| format!("Failed to create MacOS dir: {}", e))?;

    // Copy dylib
    fs::copy(library_path, macos_dir.join(display_name))
        .map_err(|e| format!("Failed to copy dylib: {}", e))?;

    // Create Info.plist
    fs::write(
        contents_dir.join("Info.plist"),
        create_info_plist(package, display_name),
    )
    .map_err(|e| format!("Failed to write Info.plist: {}", e))?;

    // Create PkgInfo
    fs::write(contents_dir.join("PkgInfo"), "BNDL????")
        .map_err(|e| format!("Failed to write PkgInfo: {}", e))?;

    // Ad-hoc code sign (required for modern macOS)
    println!("Code signing...");
    let sign_status = Command::new("codesign")
        .args(["--force", "--deep", "--sign", "-"])
        .arg(bundle_dir)
        .status();

    match sign_status {
        Ok(status) if status.success() => println!("Code signing successful"),
        Ok(_) => println!("Warning: Code signing failed (plugin may not load)"),
        Err(e) => println!("Warning: Could not run codesign: {}", e),
    }

    Ok(())
}

fn get_workspace_root() -> Result<PathBuf, String> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .map_err(|e| format!("Failed to locate workspace: {}", e))?;

    if !output.status.success() {
        return Err("Failed to locate workspace".to_string());
    }

    let cargo_toml = String::from_utf8_lossy(&output.stdout);
    let path = PathBuf::from(cargo_toml.trim());
    path.parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| "Invalid workspace path".to_string())
}

/// CamelCase plugin name, e.g. "ferrule-gain" -> "FerruleGain".
fn to_display_name(package: &str) -> String {
    package
        .split(['-', '_'])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

fn create_info_plist(package: &str, executable_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleDevelopmentRegion</key>
    <string>English</string>
    <key>CFBundleExecutable</key>
    <string>{executable}</string>
    <key>CFBundleIdentifier</key>
    <string>com.ferrule.{package}</string>
    <key>CFBundleInfoDictionaryVersion</key>
    <string>6.0</string>
    <key>CFBundleName</key>
    <string>{executable}</string>
    <key>CFBundlePackageType</key>
    <string>BNDL</string>
    <key>CFBundleSignature</key>
    <string>????</string>
    <key>CFBundleVersion</key>
    <string>{version}</string>
    <key>CFBundleShortVersionString</key>
    <string>{version}</string>
</dict>
</plist>
"#,
        executable = executable_name,
        package = package,
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn install_plugin(plugin_path: &Path, install_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(install_dir)
        .map_err(|e| format!("Failed to create plugin dir: {}", e))?;

    let file_name = plugin_path
        .file_name()
        .ok_or_else(|| format!("Invalid plugin path: {}", plugin_path.display()))?;
    let dest = install_dir.join(file_name);

    // Remove existing installation
    if dest.is_dir() {
        fs::remove_dir_all(&dest)
            .map_err(|e| format!("Failed to remove old installation: {}", e))?;
    }

    if plugin_path.is_dir() {
        copy_dir_all(plugin_path, &dest)?;
    } else {
        fs::copy(plugin_path, &dest).map_err(|e| format!("Failed to copy plugin: {}", e))?;
    }

    println!("VST installed to: {}", dest.display());
    Ok(())
}

fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), String> {
    fs::create_dir_all(dst).map_err(|e| format!("Failed to create dir: {}", e))?;

    for entry in fs::read_dir(src).map_err(|e| format!("Failed to read dir: {}", e))? {
        let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
        let ty = entry
            .file_type()
            .map_err(|e| format!("Failed to get file type: {}", e))?;

        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .map_err(|e| format!("Failed to copy file: {}", e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(to_display_name("ferrule-gain"), "FerruleGain");
        assert_eq!(to_display_name("midi_transform"), "MidiTransform");
    }

    #[test]
    fn test_platform_file_names() {
        assert_eq!(Platform::MacOs.library_file("ferrule_gain"), "libferrule_gain.dylib");
        assert_eq!(Platform::Windows.library_file("ferrule_gain"), "ferrule_gain.dll");
        assert_eq!(Platform::Linux.plugin_file("FerruleGain"), "FerruleGain.so");
        assert_eq!(Platform::MacOs.plugin_file("FerruleGain"), "FerruleGain.vst");
    }
}
