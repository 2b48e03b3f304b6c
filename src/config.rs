//! Configuration options for opening a record store.

/// Configuration options for opening a file-backed record store.
#[derive(Debug, Clone)]
pub struct Options {
    /// Create the slot file if it doesn't exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Error if the slot file already exists.
    /// Default: false
    pub error_if_exists: bool,

    /// fsync the file after every slot write.
    /// When false, writes are left in the OS page cache and nothing is synced:
    /// they survive a process crash but can be lost on power failure or an
    /// OS crash.
    /// Default: true
    pub sync_writes: bool,

    /// Keep the previous file as `<path>.bak` when the file is rewritten
    /// by an ordered insert or a defragmentation.
    /// Default: true
    pub keep_backup: bool,

    /// Which validation rule set mutations are checked against.
    /// Default: ValidationProfile::Default
    pub validation: ValidationProfile,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            sync_writes: true,
            keep_backup: true,
            validation: ValidationProfile::Default,
        }
    }
}

/// Built-in validation rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationProfile {
    /// The standard rules.
    #[default]
    Default,
    /// The stricter custom rules.
    Custom,
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the slot file if it doesn't exist.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether opening an existing slot file is an error.
    pub fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Enables or disables fsync after every write.
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Enables or disables the backup kept on whole-file rewrites.
    pub fn keep_backup(mut self, value: bool) -> Self {
        self.keep_backup = value;
        self
    }

    /// Sets the validation rule set.
    pub fn validation(mut self, profile: ValidationProfile) -> Self {
        self.validation = profile;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.error_if_exists && !self.create_if_missing {
            return Err(crate::Error::invalid_argument(
                "error_if_exists requires create_if_missing",
            ));
        }
        Ok(())
    }
}
