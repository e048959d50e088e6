use std::io::{self, Write};

use serde_json::Value;

use crate::error::CliError;

/// Writes one JSON document to stdout.
pub fn render(data: &Value, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut handle, data)?;
    } else {
        serde_json::to_writer(&mut handle, data)?;
    }
    writeln!(handle)?;
    handle.flush()?;
    Ok(())
}
