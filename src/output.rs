use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file, named by substituting the key into
/// `file_template` (e.g. `"{}.csv"`).
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_name(&self, location_key: &str) -> anyhow::Result<String> {
        formatx!(&self.file_template, location_key)
            .map_err(|_| anyhow!("Could not use file template {}", self.file_template))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.directory_path.join(self.file_name(location_key)?),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_name_files_from_template() {
        let output = FileOutput::new(PathBuf::from("/tmp"), "case_{}.csv".to_string());
        assert_eq!(output.file_name("results").unwrap(), "case_results.csv");
    }

    #[rstest]
    fn sink_accepts_writes() {
        let output = SinkOutput;
        let mut writer = output.writer_for_location_key("results").unwrap();
        writer.write_all(b"ignored").unwrap();
        assert!(output.is_noop());
    }
}
