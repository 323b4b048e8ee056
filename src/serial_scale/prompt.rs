use std::io::{BufRead, Write};

use serial_scale::{
    Confirmation,
    error::{ScaleError, ScaleResult},
};

/// Waits for Enter on stdin
pub(crate) struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&mut self, known_mass: f64) -> ScaleResult<()> {
        print!(
            "Place the known mass ({}) on the scale and press Enter when ready...",
            known_mass
        );
        std::io::stdout()
            .flush()
            .map_err(|e| ScaleError::Communication(format!("Failed to prompt: {}", e)))?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| ScaleError::Communication(format!("Failed to read stdin: {}", e)))?;
        if read == 0 {
            return Err(ScaleError::Communication(
                "stdin closed before the mass was confirmed".to_string(),
            ));
        }

        Ok(())
    }
}
