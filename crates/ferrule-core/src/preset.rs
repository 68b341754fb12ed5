//! Bank and program load negotiation.

/// Header of a bank or program file the host is about to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchChunkInfo {
    /// Format version of the file.
    pub version: i32,
    /// Unique id of the plugin that saved the file.
    pub plugin_unique_id: i32,
    /// Version of the plugin that saved the file.
    pub plugin_version: i32,
    /// Number of programs (bank) or parameters (program) in the file.
    pub num_elements: i32,
}

impl PatchChunkInfo {
    /// Returns true if the file was written by a plugin with this unique id.
    pub fn is_from(&self, unique_id: i32) -> bool {
        self.plugin_unique_id == unique_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_from() {
        let info = PatchChunkInfo {
            version: 1,
            plugin_unique_id: 42,
            plugin_version: 1000,
            num_elements: 8,
        };
        assert!(info.is_from(42));
        assert!(!info.is_from(7));
    }
}
