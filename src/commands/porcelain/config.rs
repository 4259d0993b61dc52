use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print `key`, or set it when `value` is given
    ///
    /// # Arguments
    ///
    /// * `key` - dotted key such as `user.name`
    /// * `value` - new value; `None` reads the current one
    ///
    /// # Returns
    ///
    /// An error when reading a key that is not set, or when the key or value
    /// is rejected by [`Config::set`](crate::areas::config::Config::set).
    pub fn config_command(&mut self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        self.require_repository()?;

        match value {
            Some(value) => self.config().set(key, value)?,
            None => match self.config().get(key)? {
                Some(value) => writeln!(self.writer(), "{}", value)?,
                None => anyhow::bail!("config key '{}' is not set", key),
            },
        }

        Ok(())
    }
}
