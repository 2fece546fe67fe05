//! Display surfaces for the client.

use std::io::Write;

/// Where played-back text ends up
pub trait DisplaySurface: Send {
    fn write(&mut self, text: &str);
}

/// Writes straight to the terminal
#[derive(Debug, Default)]
pub struct StdoutSurface;

impl DisplaySurface for StdoutSurface {
    fn write(&mut self, text: &str) {
        print!("{}", text);
        std::io::stdout().flush().ok();
    }
}

#[cfg(test)]
pub(crate) use test_surface::BufferSurface;
