use category_dictionary::{ColumnOptions, KeyWidth, Result};

/// CLI config for the key widths used by dictionary encoded string columns.
#[derive(Debug, Clone, Copy, clap::Parser)]
pub struct DictionaryConfig {
    /// Key width that new string columns start with.
    ///
    /// One of `narrow` (1 byte keys, up to 254 categories), `medium` (2 byte
    /// keys, up to 65534 categories) or `wide` (4 byte keys). A column is
    /// promoted to the next width when it runs out of keys.
    #[clap(
        long = "dictionary-initial-width",
        env = "CATEGORY_DICTIONARY_INITIAL_WIDTH",
        default_value = "narrow",
        action
    )]
    pub initial_width: KeyWidth,

    /// Widest key width a string column may be promoted to.
    ///
    /// Appending a new category to a column that is out of keys at this width
    /// fails instead of promoting.
    #[clap(
        long = "dictionary-max-width",
        env = "CATEGORY_DICTIONARY_MAX_WIDTH",
        default_value = "wide",
        action
    )]
    pub max_width: KeyWidth,
}

impl DictionaryConfig {
    /// Build the [`ColumnOptions`] described by this config
    pub fn build(self) -> Result<ColumnOptions> {
        let options = ColumnOptions {
            initial_width: self.initial_width,
            max_width: self.max_width,
        };
        options.validate()?;
        Ok(options)
    }
}
